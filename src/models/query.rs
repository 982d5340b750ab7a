use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::models::label::Label;
use crate::models::transaction::TransactionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for Granularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" => Ok(Self::Hour),
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(AppError::InvalidQuery(format!(
                "Unknown granularity '{}'. Use: hour, day, week, month",
                s
            ))),
        }
    }
}

/// Which transactions feed a running total, and with what sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesView {
    /// Income adds, expense subtracts.
    #[default]
    Combined,
    IncomeOnly,
    ExpenseOnly,
}

impl SeriesView {
    /// Contribution of a transaction to the running total, `None` when the
    /// view ignores its kind.
    pub fn contribution(&self, kind: TransactionKind, amount_cents: i64) -> Option<i64> {
        match (self, kind) {
            (SeriesView::Combined, _) => Some(kind.signed(amount_cents)),
            (SeriesView::IncomeOnly, TransactionKind::Income) => Some(amount_cents),
            (SeriesView::ExpenseOnly, TransactionKind::Expense) => Some(amount_cents),
            _ => None,
        }
    }

    pub fn for_kind(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => SeriesView::IncomeOnly,
            TransactionKind::Expense => SeriesView::ExpenseOnly,
        }
    }
}

impl FromStr for SeriesView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "combined" | "net" | "all" => Ok(Self::Combined),
            "income" | "incomeonly" | "deposits" => Ok(Self::IncomeOnly),
            "expense" | "expenses" | "expenseonly" | "withdrawals" => Ok(Self::ExpenseOnly),
            _ => Err(AppError::InvalidQuery(format!(
                "Unknown view '{}'. Use: combined, income, expense",
                s
            ))),
        }
    }
}

/// How transactions are selected by side hustle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelFilter {
    /// Every transaction.
    #[default]
    Unfiltered,
    /// Only transactions that match some known label.
    AnyKnownLabel,
    /// Only transactions whose matched label is this one.
    ExactLabel(Label),
}

impl LabelFilter {
    pub fn exact(name: &str) -> Result<Self, AppError> {
        Label::new(name)
            .map(LabelFilter::ExactLabel)
            .ok_or_else(|| AppError::InvalidQuery("Label must not be blank".into()))
    }

    pub fn label(&self) -> Option<&Label> {
        match self {
            LabelFilter::ExactLabel(label) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFilter::Unfiltered => f.write_str("all"),
            LabelFilter::AnyKnownLabel => f.write_str("side-hustles"),
            LabelFilter::ExactLabel(label) => f.write_str(label.name()),
        }
    }
}
