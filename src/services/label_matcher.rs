use crate::models::{Label, LabelSet, Transaction, OTHER_LABEL};

/// Finds the label a description belongs to.
///
/// Matching is case-insensitive substring containment. `LabelSet` keeps its
/// labels longest first, so when several labels occur in the description the
/// most specific one wins.
pub fn match_label<'a>(description: &str, labels: &'a LabelSet) -> Option<&'a Label> {
    if labels.is_empty() {
        return None;
    }
    match_key(&description.to_lowercase(), labels)
}

/// Same as [`match_label`] for an already lower-cased description.
pub fn match_key<'a>(description_key: &str, labels: &'a LabelSet) -> Option<&'a Label> {
    labels
        .iter()
        .find(|label| description_key.contains(label.key()))
}

pub fn match_transaction<'a>(txn: &Transaction, labels: &'a LabelSet) -> Option<&'a Label> {
    match_key(txn.description_key(), labels)
}

/// Category name for a transaction, `Other` when nothing matches.
pub fn category_of(txn: &Transaction, labels: &LabelSet) -> String {
    match_transaction(txn, labels)
        .map(|l| l.name().to_string())
        .unwrap_or_else(|| OTHER_LABEL.to_string())
}
