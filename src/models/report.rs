use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::date_utils::DateRange;
use crate::models::ordered::OrderedMap;
use crate::models::query::{Granularity, SeriesView};
use crate::models::transaction::{cents_to_amount, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRangeView {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<&DateRange> for TimeRangeView {
    fn from(range: &DateRange) -> Self {
        Self {
            from: range.start,
            to: range.end,
        }
    }
}

/// Totals over the filtered period, independent of the bucket layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub period_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMetadata {
    pub label_filter: String,
    pub view: SeriesView,
    pub granularity: Granularity,
    pub buckets: usize,
    pub current_bucket: Option<String>,
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub skipped_records: usize,
    pub timezone: String,
    pub time_range: TimeRangeView,
}

/// Running totals per bucket plus the query context they were computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub running_totals: OrderedMap<f64>,
    pub summary: PeriodSummary,
    pub metadata: SeriesMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub total_cents: i64,
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Per-label totals for one transaction kind, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub shares: Vec<CategoryShare>,
    pub total_cents: i64,
}

impl CategoryBreakdown {
    pub fn get(&self, label: &str) -> Option<&CategoryShare> {
        self.shares.iter().find(|s| s.label == label)
    }

    pub fn amounts(&self) -> OrderedMap<f64> {
        self.shares
            .iter()
            .map(|s| (s.label.clone(), cents_to_amount(s.total_cents)))
            .collect()
    }

    pub fn percentages(&self) -> OrderedMap<f64> {
        self.shares
            .iter()
            .map(|s| (s.label.clone(), s.percentage))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySplit {
    pub income: CategoryBreakdown,
    pub expense: CategoryBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindPair<T> {
    pub income: T,
    pub expenses: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetadata {
    pub label_filter: String,
    pub transaction_count: usize,
    pub skipped_records: usize,
    pub time_range: TimeRangeView,
}

/// Pie-chart payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub income: OrderedMap<f64>,
    pub expenses: OrderedMap<f64>,
    pub percentages: KindPair<OrderedMap<f64>>,
    pub totals: KindPair<f64>,
    pub metadata: CategoryMetadata,
}

impl CategoryReport {
    pub fn new(split: &CategorySplit, metadata: CategoryMetadata) -> Self {
        Self {
            income: split.income.amounts(),
            expenses: split.expense.amounts(),
            percentages: KindPair {
                income: split.income.percentages(),
                expenses: split.expense.percentages(),
            },
            totals: KindPair {
                income: cents_to_amount(split.income.total_cents),
                expenses: cents_to_amount(split.expense.total_cents),
            },
            metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_income: f64,
    pub avg_income_txn: f64,
    pub avg_expense_txn: f64,
    pub growth_pct: f64,
    pub profit_margin_pct: f64,
    pub income_count: usize,
    pub expense_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityProfile {
    /// Income transactions per hour of day, index 0 = midnight.
    pub hourly: Vec<u32>,
    /// Income transactions per weekday, Sunday first.
    pub daily: OrderedMap<u32>,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub label: Option<String>,
}

impl TransactionView {
    pub fn new(txn: &Transaction, label: Option<String>) -> Self {
        Self {
            id: txn.id().to_string(),
            kind: txn.kind(),
            amount: cents_to_amount(txn.amount_cents()),
            description: txn.description().to_string(),
            transaction_date: txn.timestamp(),
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingMetadata {
    pub label: Option<String>,
    pub original_count: usize,
    pub filtered_count: usize,
    pub skipped_records: usize,
}

/// One kind of record, optionally narrowed to a side hustle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordListing {
    pub kind: TransactionKind,
    pub records: Vec<TransactionView>,
    pub total_amount: f64,
    pub count: usize,
    pub metadata: ListingMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    LookingGood,
    NeedsHelp,
}

impl DashboardStatus {
    pub fn from_totals(income_cents: i64, expense_cents: i64) -> Self {
        if income_cents > expense_cents {
            DashboardStatus::LookingGood
        } else {
            DashboardStatus::NeedsHelp
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DashboardStatus::LookingGood => "Looking Good!",
            DashboardStatus::NeedsHelp => {
                "Hm, you might need some help... visit the Help tab for some tips!"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_income: f64,
    pub income_count: usize,
    pub expense_count: usize,
    pub label_count: usize,
    pub status: DashboardStatus,
    pub message: &'static str,
    pub skipped_records: usize,
    pub last_updated: DateTime<Utc>,
}

/// Figures describing one side hustle, as handed to the advisor chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub label: String,
    pub metrics: Metrics,
    pub activity: ActivityProfile,
    pub recent_transactions: Vec<TransactionView>,
    pub skipped_records: usize,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelList {
    pub account_id: String,
    pub labels: Vec<String>,
    pub count: usize,
}

impl LabelList {
    pub fn new(account_id: &str, labels: Vec<String>) -> Self {
        Self {
            account_id: account_id.to_string(),
            count: labels.len(),
            labels,
        }
    }
}
