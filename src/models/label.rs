use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Label used for transactions that match no known side hustle.
pub const OTHER_LABEL: &str = "Other";

/// A user-declared side-hustle name. Identity is case-insensitive; the
/// declared spelling is kept for display.
#[derive(Debug, Clone)]
pub struct Label {
    name: String,
    key: String,
}

impl Label {
    /// Returns `None` for a blank name, which would otherwise match everything.
    pub fn new(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            name: trimmed.to_string(),
            key: trimmed.to_lowercase(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is(&self, name: &str) -> bool {
        self.key == name.trim().to_lowercase()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Known labels for one account, kept in matching order: longest first, then
/// alphabetical, so the most specific label wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut labels: Vec<Label> = names
            .into_iter()
            .filter_map(|n| Label::new(n.as_ref()))
            .filter(|l| seen.insert(l.key.clone()))
            .collect();
        labels.sort_by(|a, b| {
            b.key
                .chars()
                .count()
                .cmp(&a.key.chars().count())
                .then_with(|| a.key.cmp(&b.key))
        });
        Self { labels }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.is(name))
    }

    /// A copy that also knows `label`, keeping the matching order.
    pub fn with_label(&self, label: &Label) -> Self {
        if self.labels.contains(label) {
            return self.clone();
        }
        Self::from_names(
            self.labels
                .iter()
                .map(|l| l.name.as_str())
                .chain(std::iter::once(label.name.as_str())),
        )
    }

    pub fn names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}
