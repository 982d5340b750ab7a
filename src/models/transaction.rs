use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Name of the record collection this kind is read from upstream.
    pub fn source_name(&self) -> &'static str {
        match self {
            TransactionKind::Income => "deposit",
            TransactionKind::Expense => "withdrawal",
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Deposit",
            TransactionKind::Expense => "Withdrawal",
        }
    }

    /// Contribution to a balance: income adds, expense subtracts.
    pub fn signed(&self, amount_cents: i64) -> i64 {
        match self {
            TransactionKind::Income => amount_cents,
            TransactionKind::Expense => -amount_cents,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized deposit or withdrawal.
///
/// The amount is a non-negative magnitude in cents; the sign lives in `kind`.
/// Values are never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: String,
    kind: TransactionKind,
    amount_cents: i64,
    description: String,
    description_key: String,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Returns `None` for a negative amount.
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount_cents: i64,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        if amount_cents < 0 {
            return None;
        }
        let description = description.into();
        Some(Self {
            id: id.into(),
            kind,
            amount_cents,
            description_key: description.to_lowercase(),
            description,
            timestamp,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn signed_cents(&self) -> i64 {
        self.kind.signed(self.amount_cents)
    }

    /// Description as received, for display.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lower-cased description used for label matching.
    pub fn description_key(&self) -> &str {
        &self.description_key
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn amount_display(&self) -> String {
        format_cents(self.signed_cents())
    }
}

/// Upper bound for a single amount; anything larger is treated as garbage.
const MAX_AMOUNT: f64 = 1e13;

/// Converts a raw amount into cents of its magnitude.
pub fn amount_to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount.abs() > MAX_AMOUNT {
        return None;
    }
    Some((amount.abs() * 100.0).round() as i64)
}

pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

pub fn format_cents(cents: i64) -> String {
    let is_negative = cents < 0;
    let abs_cents = cents.abs();
    let dollars = abs_cents / 100;
    let remainder = abs_cents % 100;

    if is_negative {
        format!("-{}.{:02}", dollars, remainder)
    } else {
        format!("{}.{:02}", dollars, remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_negative_amount_rejected() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(Transaction::new("a", TransactionKind::Income, -1, "x", ts).is_none());
        assert!(Transaction::new("a", TransactionKind::Income, 0, "x", ts).is_some());
    }

    #[test]
    fn test_description_key_is_lowercase_but_display_preserved() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let txn = Transaction::new("a", TransactionKind::Expense, 1250, "Uber - Gas", ts).unwrap();
        assert_eq!(txn.description(), "Uber - Gas");
        assert_eq!(txn.description_key(), "uber - gas");
        assert_eq!(txn.signed_cents(), -1250);
        assert_eq!(txn.amount_display(), "-12.50");
    }

    #[test]
    fn test_amount_to_cents() {
        assert_eq!(amount_to_cents(12.346), Some(1235));
        assert_eq!(amount_to_cents(-40.0), Some(4000));
        assert_eq!(amount_to_cents(0.1 + 0.2), Some(30));
        assert_eq!(amount_to_cents(f64::NAN), None);
        assert_eq!(amount_to_cents(f64::INFINITY), None);
    }

    #[test]
    fn test_round2_guards_non_finite() {
        assert_eq!(round2(2.456), 2.46);
        assert_eq!(round2(-7.004), -7.0);
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
    }
}
