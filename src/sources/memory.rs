use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{AppError, AppResult, Collaborator};
use crate::models::{NewRecord, RawRecord, TransactionKind};
use crate::sources::{delete_label, insert_label, LabelStore, TransactionSource};

#[derive(Debug, Default)]
struct Records {
    deposits: Vec<RawRecord>,
    withdrawals: Vec<RawRecord>,
}

impl Records {
    fn of_kind(&mut self, kind: TransactionKind) -> &mut Vec<RawRecord> {
        match kind {
            TransactionKind::Income => &mut self.deposits,
            TransactionKind::Expense => &mut self.withdrawals,
        }
    }
}

fn poisoned(collaborator: Collaborator, account_id: &str) -> AppError {
    AppError::source_unavailable(collaborator, account_id, "in-memory store lock poisoned")
}

/// Transaction source backed by process memory, used for local runs and tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    accounts: RwLock<HashMap<String, Records>>,
    offline: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails as unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_records(
        self,
        account_id: &str,
        deposits: Vec<RawRecord>,
        withdrawals: Vec<RawRecord>,
    ) -> Self {
        if let Ok(mut accounts) = self.accounts.write() {
            let records = accounts.entry(account_id.to_string()).or_default();
            records.deposits.extend(deposits);
            records.withdrawals.extend(withdrawals);
        }
        self
    }

    fn check_online(&self, account_id: &str) -> AppResult<()> {
        if self.offline {
            return Err(AppError::source_unavailable(
                Collaborator::TransactionSource,
                account_id,
                "sandbox is offline",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn list(&self, account_id: &str, kind: TransactionKind) -> AppResult<Vec<RawRecord>> {
        self.check_online(account_id)?;
        let accounts = self
            .accounts
            .read()
            .map_err(|_| poisoned(Collaborator::TransactionSource, account_id))?;
        Ok(accounts
            .get(account_id)
            .map(|r| match kind {
                TransactionKind::Income => r.deposits.clone(),
                TransactionKind::Expense => r.withdrawals.clone(),
            })
            .unwrap_or_default())
    }

    async fn create(
        &self,
        account_id: &str,
        kind: TransactionKind,
        record: &NewRecord,
    ) -> AppResult<RawRecord> {
        self.check_online(account_id)?;
        let created = RawRecord::from_new(record).with_id(uuid::Uuid::new_v4().to_string());
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| poisoned(Collaborator::TransactionSource, account_id))?;
        accounts
            .entry(account_id.to_string())
            .or_default()
            .of_kind(kind)
            .push(created.clone());
        Ok(created)
    }
}

/// Label store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryLabelStore {
    accounts: RwLock<HashMap<String, Vec<String>>>,
    offline: bool,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_labels<I, S>(self, account_id: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts
                .entry(account_id.to_string())
                .or_default()
                .extend(labels.into_iter().map(Into::into));
        }
        self
    }

    fn check_online(&self, account_id: &str) -> AppResult<()> {
        if self.offline {
            return Err(AppError::source_unavailable(
                Collaborator::LabelStore,
                account_id,
                "label store is offline",
            ));
        }
        Ok(())
    }

    fn update<F>(&self, account_id: &str, change: F) -> AppResult<Vec<String>>
    where
        F: FnOnce(&mut Vec<String>) -> AppResult<()>,
    {
        self.check_online(account_id)?;
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| poisoned(Collaborator::LabelStore, account_id))?;
        let labels = accounts.entry(account_id.to_string()).or_default();
        change(labels)?;
        Ok(labels.clone())
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn list_labels(&self, account_id: &str) -> AppResult<Vec<String>> {
        self.check_online(account_id)?;
        let accounts = self
            .accounts
            .read()
            .map_err(|_| poisoned(Collaborator::LabelStore, account_id))?;
        Ok(accounts.get(account_id).cloned().unwrap_or_default())
    }

    async fn add_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>> {
        self.update(account_id, |labels| insert_label(labels, label))
    }

    async fn remove_label(&self, account_id: &str, label: &str) -> AppResult<Vec<String>> {
        self.update(account_id, |labels| delete_label(labels, label))
    }
}
