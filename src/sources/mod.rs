//! Collaborators that hold the data: the banking sandbox for transactions and
//! the label file for side hustle names.

pub mod label_file;
pub mod memory;
pub mod sandbox;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NewRecord, RawRecord, TransactionKind};

pub use label_file::LabelFile;
pub use memory::{MemoryLabelStore, MemorySource};
pub use sandbox::SandboxClient;

/// Raw deposit and withdrawal records for an account.
///
/// Failures surface as `AppError::SourceUnavailable` so callers can tell an
/// empty account from an unreachable one.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn list(&self, account_id: &str, kind: TransactionKind) -> AppResult<Vec<RawRecord>>;

    async fn create(
        &self,
        account_id: &str,
        kind: TransactionKind,
        record: &NewRecord,
    ) -> AppResult<RawRecord>;

    async fn list_deposits(&self, account_id: &str) -> AppResult<Vec<RawRecord>> {
        self.list(account_id, TransactionKind::Income).await
    }

    async fn list_withdrawals(&self, account_id: &str) -> AppResult<Vec<RawRecord>> {
        self.list(account_id, TransactionKind::Expense).await
    }
}

/// Side hustle labels declared per account.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Declared labels in declaration order. Unknown accounts have none.
    async fn list_labels(&self, account_id: &str) -> AppResult<Vec<String>>;

    /// Adds a label and returns the updated list.
    ///
    /// Blank names are a `Validation` error and case-insensitive duplicates
    /// a `Conflict`.
    async fn add_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>>;

    /// Removes a label (case-insensitive) and returns the updated list.
    async fn remove_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>>;
}

/// Shared add/remove rules for label stores.
pub(crate) fn insert_label(labels: &mut Vec<String>, label: &str) -> AppResult<()> {
    let name = label.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Label must not be blank".into()));
    }
    let key = name.to_lowercase();
    if labels.iter().any(|l| l.trim().to_lowercase() == key) {
        return Err(AppError::Conflict(format!("Label '{}' already exists", name)));
    }
    labels.push(name.to_string());
    Ok(())
}

pub(crate) fn delete_label(labels: &mut Vec<String>, label: &str) -> AppResult<()> {
    let name = label.trim();
    let key = name.to_lowercase();
    let before = labels.len();
    labels.retain(|l| l.trim().to_lowercase() != key);
    if labels.len() == before {
        return Err(AppError::NotFound(format!("Label '{}' not found", name)));
    }
    Ok(())
}
