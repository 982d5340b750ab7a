use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::date_utils::ReferenceTz;
use crate::models::transaction::{cents_to_amount, round2};
use crate::models::{
    ActivityProfile, CategoryBreakdown, CategoryShare, CategorySplit, LabelSet, Metrics,
    OrderedMap, PeriodSummary, Transaction, TransactionKind,
};
use crate::services::label_matcher::category_of;
use crate::services::time_series::WEEKDAYS;

/// Income and expense totals of a transaction set, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTotals {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub income_count: usize,
    pub expense_count: usize,
}

impl KindTotals {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Self::default();
        for txn in transactions {
            match txn.kind() {
                TransactionKind::Income => {
                    totals.income_cents = totals.income_cents.saturating_add(txn.amount_cents());
                    totals.income_count += 1;
                }
                TransactionKind::Expense => {
                    totals.expense_cents =
                        totals.expense_cents.saturating_add(txn.amount_cents());
                    totals.expense_count += 1;
                }
            }
        }
        totals
    }

    pub fn net_cents(&self) -> i64 {
        self.income_cents.saturating_sub(self.expense_cents)
    }

    pub fn summary(&self) -> PeriodSummary {
        PeriodSummary {
            total_deposits: cents_to_amount(self.income_cents),
            total_withdrawals: cents_to_amount(self.expense_cents),
            period_balance: cents_to_amount(self.net_cents()),
        }
    }
}

/// `100 * part / whole`, or 0 when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

fn breakdown(totals: HashMap<String, (i64, usize)>) -> CategoryBreakdown {
    let total_cents = totals
        .values()
        .fold(0i64, |sum, (cents, _)| sum.saturating_add(*cents));

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(label, (cents, count))| CategoryShare {
            percentage: percentage(cents, total_cents),
            label,
            total_cents: cents,
            transaction_count: count,
        })
        .collect();

    shares.sort_by(|a, b| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.label.cmp(&b.label))
    });

    CategoryBreakdown {
        shares,
        total_cents,
    }
}

/// Totals per matched label, unmatched transactions going to `Other`,
/// computed separately for income and expense.
pub fn aggregate_by_category(transactions: &[&Transaction], labels: &LabelSet) -> CategorySplit {
    let mut income: HashMap<String, (i64, usize)> = HashMap::new();
    let mut expense: HashMap<String, (i64, usize)> = HashMap::new();

    for txn in transactions {
        let bucket = match txn.kind() {
            TransactionKind::Income => &mut income,
            TransactionKind::Expense => &mut expense,
        };
        let entry = bucket.entry(category_of(txn, labels)).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(txn.amount_cents());
        entry.1 += 1;
    }

    CategorySplit {
        income: breakdown(income),
        expense: breakdown(expense),
    }
}

fn average(total_cents: i64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(total_cents as f64 / count as f64 / 100.0)
}

/// Income inside `[start, end)`.
fn income_between(transactions: &[&Transaction], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    transactions
        .iter()
        .filter(|t| t.is_income() && t.timestamp() >= start && t.timestamp() < end)
        .fold(0i64, |sum, t| sum.saturating_add(t.amount_cents()))
}

/// Income growth over the 30 days before `as_of` against the 30 days before
/// that, 0 when the earlier window is empty.
pub fn growth_pct(history: &[&Transaction], as_of: DateTime<Utc>) -> f64 {
    let month = Duration::days(30);
    let recent = income_between(history, as_of - month, as_of);
    let prior = income_between(history, as_of - month - month, as_of - month);
    percentage(recent.saturating_sub(prior), prior)
}

/// Summary statistics for a transaction set.
///
/// Totals, averages and margin cover `transactions`; growth is measured on
/// `history`, which must reach at least 60 days back from `as_of` regardless
/// of the period being reported. Growth and margin are 0 whenever their
/// denominator is 0.
pub fn compute_metrics(
    transactions: &[&Transaction],
    history: &[&Transaction],
    as_of: DateTime<Utc>,
) -> Metrics {
    let totals = KindTotals::from_transactions(transactions.iter().copied());
    let growth_pct = growth_pct(history, as_of);
    let profit_margin_pct = percentage(totals.net_cents(), totals.income_cents);

    Metrics {
        total_income: cents_to_amount(totals.income_cents),
        total_expense: cents_to_amount(totals.expense_cents),
        net_income: cents_to_amount(totals.net_cents()),
        avg_income_txn: average(totals.income_cents, totals.income_count),
        avg_expense_txn: average(totals.expense_cents, totals.expense_count),
        growth_pct,
        profit_margin_pct,
        income_count: totals.income_count,
        expense_count: totals.expense_count,
    }
}

/// When income arrives: counts per hour of day and per weekday.
pub fn activity_profile(transactions: &[&Transaction], tz: ReferenceTz) -> ActivityProfile {
    let mut hourly = vec![0u32; 24];
    let mut daily = [0u32; 7];

    for txn in transactions.iter().filter(|t| t.is_income()) {
        let local = tz.local(txn.timestamp());
        hourly[local.hour() as usize] += 1;
        daily[local.weekday().num_days_from_sunday() as usize] += 1;
    }

    ActivityProfile {
        hourly,
        daily: WEEKDAYS
            .iter()
            .zip(daily)
            .map(|(day, count)| (day.to_string(), count))
            .collect::<OrderedMap<u32>>(),
        timezone: tz.name().to_string(),
    }
}

/// The `limit` newest transactions, newest first.
pub fn recent<'a>(transactions: &[&'a Transaction], limit: usize) -> Vec<&'a Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    sorted.truncate(limit);
    sorted
}
