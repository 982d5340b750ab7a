use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, Collaborator};
use crate::sources::{delete_label, insert_label, LabelStore};

/// On-disk layout: `{"accounts": {"<account id>": ["Uber", "Etsy"]}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LabelDocument {
    #[serde(default)]
    accounts: BTreeMap<String, Vec<String>>,
}

/// Labels persisted in a JSON file.
///
/// Writes go through a uniquely named temp file and a rename, serialized by a
/// mutex so two concurrent updates cannot lose each other's label. Readers
/// never write, except to create a missing file under the same mutex.
#[derive(Debug)]
pub struct LabelFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LabelFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(account_id: &str, reason: impl Into<String>) -> AppError {
        AppError::source_unavailable(Collaborator::LabelStore, account_id, reason)
    }

    /// Reads the document, `None` when the file does not exist yet.
    async fn read(&self, account_id: &str) -> AppResult<Option<LabelDocument>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Some(LabelDocument::default())),
            Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                Self::unavailable(
                    account_id,
                    format!("{} is not valid JSON: {}", self.path.display(), e),
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::unavailable(
                account_id,
                format!("Failed to read {}: {}", self.path.display(), e),
            )),
        }
    }

    /// Writes an empty document unless a writer got there first.
    async fn create_if_missing(&self, account_id: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.read(account_id).await?.is_none() {
            info!(path = %self.path.display(), "Creating empty label file");
            self.store(account_id, &LabelDocument::default()).await?;
        }
        Ok(())
    }

    /// Caller must hold `write_lock`.
    async fn store(&self, account_id: &str, doc: &LabelDocument) -> AppResult<()> {
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        let write = async {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let json = serde_json::to_string_pretty(doc)?;
            tokio::fs::write(&tmp, json).await?;
            tokio::fs::rename(&tmp, &self.path).await?;
            Ok::<_, AppError>(())
        };
        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Self::unavailable(
                account_id,
                format!("Failed to write {}: {}", self.path.display(), e),
            ));
        }
        Ok(())
    }

    async fn update<F>(&self, account_id: &str, change: F) -> AppResult<Vec<String>>
    where
        F: FnOnce(&mut Vec<String>) -> AppResult<()> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read(account_id).await?.unwrap_or_default();
        let labels = doc.accounts.entry(account_id.to_string()).or_default();
        change(labels)?;
        let updated = labels.clone();
        self.store(account_id, &doc).await?;
        Ok(updated)
    }
}

#[async_trait]
impl LabelStore for LabelFile {
    async fn list_labels(&self, account_id: &str) -> AppResult<Vec<String>> {
        let doc = match self.read(account_id).await? {
            Some(doc) => doc,
            None => {
                self.create_if_missing(account_id).await?;
                LabelDocument::default()
            }
        };
        let labels = doc.accounts.get(account_id).cloned().unwrap_or_default();
        debug!(account_id, count = labels.len(), "Loaded labels");
        Ok(labels)
    }

    async fn add_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>> {
        let labels = self
            .update(account_id, |labels| insert_label(labels, label))
            .await?;
        info!(account_id, label = label.trim(), "Added label");
        Ok(labels)
    }

    async fn remove_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>> {
        let labels = self
            .update(account_id, |labels| delete_label(labels, label))
            .await?;
        info!(account_id, label = label.trim(), "Removed label");
        Ok(labels)
    }
}
