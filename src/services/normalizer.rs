use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::transaction::amount_to_cents;
use crate::models::{RawRecord, Transaction, TransactionKind};

/// Why a raw record could not become a [`Transaction`]. Recovered locally:
/// the record is dropped and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    #[error("missing transaction_date")]
    MissingTimestamp,
    #[error("unparseable transaction_date '{0}'")]
    BadTimestamp(String),
    #[error("missing amount")]
    MissingAmount,
    #[error("amount is not a usable number: {0}")]
    BadAmount(String),
}

/// Normalized transactions plus the number of records that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub skipped: usize,
}

/// Parses the timestamp formats seen from the sandbox. Values without an
/// offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn parse_amount(value: &Value) -> Result<i64, MalformedRecord> {
    let amount = match value {
        Value::Null => return Err(MalformedRecord::MissingAmount),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount
        .and_then(amount_to_cents)
        .ok_or_else(|| MalformedRecord::BadAmount(value.to_string()))
}

pub fn normalize_record(
    raw: &RawRecord,
    kind: TransactionKind,
    index: usize,
) -> Result<Transaction, MalformedRecord> {
    let date = raw
        .transaction_date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or(MalformedRecord::MissingTimestamp)?;
    let timestamp =
        parse_timestamp(date).ok_or_else(|| MalformedRecord::BadTimestamp(date.to_string()))?;
    let amount_cents = parse_amount(&raw.amount)?;

    let id = raw
        .id
        .clone()
        .unwrap_or_else(|| format!("{}-{}", kind.source_name(), index));
    let description = raw.description.clone().unwrap_or_default();

    Transaction::new(id, kind, amount_cents, description, timestamp)
        .ok_or_else(|| MalformedRecord::BadAmount(raw.amount.to_string()))
}

/// Turns raw deposits into income and raw withdrawals into expenses.
///
/// Malformed records are logged and skipped; the rest of the batch survives.
pub fn normalize(deposits: &[RawRecord], withdrawals: &[RawRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        transactions: Vec::with_capacity(deposits.len() + withdrawals.len()),
        skipped: 0,
    };

    let sources = [
        (TransactionKind::Income, deposits),
        (TransactionKind::Expense, withdrawals),
    ];
    for (kind, records) in sources {
        for (index, raw) in records.iter().enumerate() {
            match normalize_record(raw, kind, index) {
                Ok(txn) => batch.transactions.push(txn),
                Err(e) => {
                    warn!(
                        kind = kind.source_name(),
                        index,
                        id = raw.id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Skipping malformed record"
                    );
                    batch.skipped += 1;
                }
            }
        }
    }

    batch
}
