use tracing::debug;

use crate::error::AppResult;
use crate::models::{LabelSet, Transaction, TransactionKind};
use crate::services::normalizer::{normalize, NormalizedBatch};
use crate::sources::{LabelStore, TransactionSource};

/// One consistent read of an account: its normalized transactions and the
/// label vocabulary they are matched against.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub account_id: String,
    pub transactions: Vec<Transaction>,
    pub labels: LabelSet,
    /// Raw records dropped during normalization.
    pub skipped: usize,
}

impl Ledger {
    fn from_parts(account_id: &str, batch: NormalizedBatch, labels: Vec<String>) -> Self {
        Self {
            account_id: account_id.to_string(),
            transactions: batch.transactions,
            labels: LabelSet::from_names(labels),
            skipped: batch.skipped,
        }
    }

    /// Fetches deposits, withdrawals and labels concurrently. The first
    /// collaborator failure fails the whole read.
    pub async fn load(
        source: &dyn TransactionSource,
        store: &dyn LabelStore,
        account_id: &str,
    ) -> AppResult<Self> {
        let (deposits, withdrawals, labels) = tokio::try_join!(
            source.list_deposits(account_id),
            source.list_withdrawals(account_id),
            store.list_labels(account_id),
        )?;

        let batch = normalize(&deposits, &withdrawals);
        debug!(
            account_id,
            deposits = deposits.len(),
            withdrawals = withdrawals.len(),
            labels = labels.len(),
            skipped = batch.skipped,
            "Loaded ledger snapshot"
        );
        Ok(Self::from_parts(account_id, batch, labels))
    }

    /// Same as [`Ledger::load`] for a single transaction kind.
    pub async fn load_kind(
        source: &dyn TransactionSource,
        store: &dyn LabelStore,
        account_id: &str,
        kind: TransactionKind,
    ) -> AppResult<Self> {
        let (records, labels) = tokio::try_join!(
            source.list(account_id, kind),
            store.list_labels(account_id),
        )?;

        let batch = match kind {
            TransactionKind::Income => normalize(&records, &[]),
            TransactionKind::Expense => normalize(&[], &records),
        };
        debug!(
            account_id,
            kind = kind.source_name(),
            records = records.len(),
            skipped = batch.skipped,
            "Loaded ledger snapshot"
        );
        Ok(Self::from_parts(account_id, batch, labels))
    }

    pub fn total_records(&self) -> usize {
        self.transactions.len() + self.skipped
    }
}
