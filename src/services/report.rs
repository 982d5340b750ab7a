use chrono::{DateTime, Utc};

use crate::date_utils::{DateRange, ReferenceTz};
use crate::error::AppResult;
use crate::models::report::{CategoryMetadata, ListingMetadata};
use crate::models::transaction::cents_to_amount;
use crate::models::{
    AggregationResult, AnalysisReport, CategoryReport, DashboardStatus, DashboardSummary,
    Granularity, LabelFilter, LabelSet, Metrics, RecordListing, SeriesMetadata, SeriesView,
    Transaction, TransactionKind, TransactionView,
};
use crate::services::analytics::{
    activity_profile, aggregate_by_category, compute_metrics, recent, KindTotals,
};
use crate::services::filter::{filter, TransactionFilter};
use crate::services::label_matcher::match_transaction;
use crate::services::snapshot::Ledger;
use crate::services::time_series::{aggregate, TimeBucketSpec};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const MAX_RECENT_LIMIT: usize = 100;

/// A validated running-total query. Building one is the only step that can
/// reject the request, so it happens before anything is fetched.
#[derive(Debug, Clone)]
pub struct SeriesQuery {
    pub granularity: Granularity,
    pub spec: TimeBucketSpec,
    pub view: SeriesView,
    pub filter: LabelFilter,
}

impl SeriesQuery {
    pub fn new(
        granularity: Granularity,
        range: DateRange,
        tz: ReferenceTz,
        view: SeriesView,
        filter: LabelFilter,
    ) -> AppResult<Self> {
        Ok(Self {
            granularity,
            spec: TimeBucketSpec::resolve(granularity, range, tz)?,
            view,
            filter,
        })
    }
}

fn labelled_view(txn: &Transaction, labels: &LabelSet) -> TransactionView {
    let label = match_transaction(txn, labels).map(|l| l.name().to_string());
    TransactionView::new(txn, label)
}

/// Running totals plus period summary for one query.
pub fn build_series(ledger: &Ledger, query: &SeriesQuery) -> AggregationResult {
    let range = *query.spec.range();
    let selected: Vec<&Transaction> =
        filter(&ledger.transactions, range, &query.filter, &ledger.labels)
            .into_iter()
            .filter(|t| query.view.contribution(t.kind(), t.amount_cents()).is_some())
            .collect();

    let series = aggregate(&selected, &query.spec, query.view);
    let totals = KindTotals::from_transactions(selected.iter().copied());

    AggregationResult {
        running_totals: series.running_totals(),
        summary: totals.summary(),
        metadata: SeriesMetadata {
            label_filter: query.filter.to_string(),
            view: query.view,
            granularity: query.granularity,
            buckets: series.labels.len(),
            current_bucket: series.current_bucket().map(str::to_string),
            transaction_count: series.counted,
            income_count: totals.income_count,
            expense_count: totals.expense_count,
            skipped_records: ledger.skipped,
            timezone: query.spec.tz().name().to_string(),
            time_range: (&range).into(),
        },
    }
}

/// Pie-chart breakdown of the transactions selected by `range` and `mode`.
pub fn build_categories(ledger: &Ledger, range: DateRange, mode: &LabelFilter) -> CategoryReport {
    let selected = filter(&ledger.transactions, range, mode, &ledger.labels);
    let split = aggregate_by_category(&selected, &ledger.labels);

    CategoryReport::new(
        &split,
        CategoryMetadata {
            label_filter: mode.to_string(),
            transaction_count: selected.len(),
            skipped_records: ledger.skipped,
            time_range: (&range).into(),
        },
    )
}

pub fn build_metrics(
    ledger: &Ledger,
    range: DateRange,
    mode: &LabelFilter,
    as_of: DateTime<Utc>,
) -> Metrics {
    let selected = filter(&ledger.transactions, range, mode, &ledger.labels);
    let history = filter(
        &ledger.transactions,
        DateRange::all_time(as_of),
        mode,
        &ledger.labels,
    );
    compute_metrics(&selected, &history, as_of)
}

/// Records of a single kind, optionally narrowed to one label, in source order.
pub fn build_listing(
    ledger: &Ledger,
    kind: TransactionKind,
    mode: &LabelFilter,
) -> RecordListing {
    let of_kind: Vec<&Transaction> = ledger
        .transactions
        .iter()
        .filter(|t| t.kind() == kind)
        .collect();
    let selector = TransactionFilter::new(DateRange::unbounded(), mode, &ledger.labels);
    let records: Vec<TransactionView> = of_kind
        .iter()
        .filter(|t| selector.accepts(t))
        .map(|t| labelled_view(t, &ledger.labels))
        .collect();

    let total_cents = of_kind
        .iter()
        .filter(|t| selector.accepts(t))
        .fold(0i64, |sum, t| sum.saturating_add(t.amount_cents()));

    RecordListing {
        kind,
        total_amount: cents_to_amount(total_cents),
        count: records.len(),
        metadata: ListingMetadata {
            label: mode.label().map(|l| l.name().to_string()),
            original_count: of_kind.len(),
            filtered_count: records.len(),
            skipped_records: ledger.skipped,
        },
        records,
    }
}

/// Newest transactions of both kinds.
pub fn build_recent(ledger: &Ledger, mode: &LabelFilter, limit: usize) -> Vec<TransactionView> {
    let selected = filter(
        &ledger.transactions,
        DateRange::unbounded(),
        mode,
        &ledger.labels,
    );
    recent(&selected, limit)
        .into_iter()
        .map(|t| labelled_view(t, &ledger.labels))
        .collect()
}

/// Side-hustle totals over all time up to `now`.
pub fn build_dashboard(ledger: &Ledger, now: DateTime<Utc>) -> DashboardSummary {
    let range = DateRange::all_time(now);
    let selected = filter(
        &ledger.transactions,
        range,
        &LabelFilter::AnyKnownLabel,
        &ledger.labels,
    );
    let totals = KindTotals::from_transactions(selected.iter().copied());
    let status = DashboardStatus::from_totals(totals.income_cents, totals.expense_cents);

    DashboardSummary {
        total_income: cents_to_amount(totals.income_cents),
        total_expense: cents_to_amount(totals.expense_cents),
        net_income: cents_to_amount(totals.net_cents()),
        income_count: totals.income_count,
        expense_count: totals.expense_count,
        label_count: ledger.labels.len(),
        status,
        message: status.message(),
        skipped_records: ledger.skipped,
        last_updated: now,
    }
}

/// Everything known about one side hustle up to `as_of`.
pub fn build_analysis(
    ledger: &Ledger,
    mode: &LabelFilter,
    tz: ReferenceTz,
    as_of: DateTime<Utc>,
) -> AnalysisReport {
    let range = DateRange::all_time(as_of);
    let selected = filter(&ledger.transactions, range, mode, &ledger.labels);
    let label = mode.to_string();

    AnalysisReport {
        metrics: compute_metrics(&selected, &selected, as_of),
        activity: activity_profile(&selected, tz),
        recent_transactions: recent(&selected, DEFAULT_RECENT_LIMIT)
            .into_iter()
            .map(|t| TransactionView::new(t, Some(label.clone())))
            .collect(),
        label,
        skipped_records: ledger.skipped,
        as_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_utils::RangePreset;
    use crate::models::OTHER_LABEL;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()
    }

    fn txn(id: &str, kind: TransactionKind, cents: i64, desc: &str, ts: DateTime<Utc>) -> Transaction {
        Transaction::new(id, kind, cents, desc, ts).unwrap()
    }

    fn ledger() -> Ledger {
        let today = |h: u32| Utc.with_ymd_and_hms(2024, 5, 15, h, 0, 0).unwrap();
        Ledger {
            account_id: "acc".into(),
            transactions: vec![
                txn("d1", TransactionKind::Income, 4500, "Uber Income", today(9)),
                txn("d2", TransactionKind::Income, 2000, "Etsy sale", today(11)),
                txn("d3", TransactionKind::Income, 10000, "Payroll", today(12)),
                txn("w1", TransactionKind::Expense, 1500, "Uber - Gas", today(10)),
                txn("w2", TransactionKind::Expense, 800, "Groceries", today(13)),
                txn(
                    "old",
                    TransactionKind::Income,
                    700,
                    "Uber tips",
                    now() - Duration::days(40),
                ),
            ],
            labels: LabelSet::from_names(["Uber", "Etsy"]),
            skipped: 2,
        }
    }

    #[test]
    fn test_series_for_today_by_hour() {
        let range = DateRange::from_preset(RangePreset::Today, now(), ReferenceTz::utc());
        let query = SeriesQuery::new(
            Granularity::Hour,
            range,
            ReferenceTz::utc(),
            SeriesView::Combined,
            LabelFilter::Unfiltered,
        )
        .unwrap();

        let result = build_series(&ledger(), &query);
        assert_eq!(result.running_totals.len(), 15);
        assert_eq!(result.running_totals.get("09"), Some(&45.0));
        assert_eq!(result.running_totals.get("10"), Some(&30.0));
        assert_eq!(result.running_totals.get("13"), Some(&142.0));
        assert_eq!(result.running_totals.get("14"), Some(&142.0));
        assert_eq!(result.summary.period_balance, 142.0);
        assert_eq!(result.metadata.transaction_count, 5);
        assert_eq!(result.metadata.current_bucket.as_deref(), Some("14"));
        assert_eq!(result.metadata.skipped_records, 2);
        assert_eq!(result.metadata.label_filter, "all");
    }

    #[test]
    fn test_series_side_hustles_only() {
        let range = DateRange::from_preset(RangePreset::Today, now(), ReferenceTz::utc());
        let query = SeriesQuery::new(
            Granularity::Hour,
            range,
            ReferenceTz::utc(),
            SeriesView::IncomeOnly,
            LabelFilter::AnyKnownLabel,
        )
        .unwrap();

        let result = build_series(&ledger(), &query);
        assert_eq!(result.running_totals.get("14"), Some(&65.0));
        assert_eq!(result.summary.total_withdrawals, 0.0);
        assert_eq!(result.metadata.income_count, 2);
        assert_eq!(result.metadata.expense_count, 0);
    }

    #[test]
    fn test_categories_split_by_label() {
        let range = DateRange::from_preset(RangePreset::Today, now(), ReferenceTz::utc());
        let report = build_categories(&ledger(), range, &LabelFilter::Unfiltered);

        assert_eq!(report.income.get("Uber"), Some(&45.0));
        assert_eq!(report.income.get(OTHER_LABEL), Some(&100.0));
        assert_eq!(report.expenses.get("Uber"), Some(&15.0));
        assert_eq!(report.totals.income, 165.0);
        assert_eq!(report.metadata.transaction_count, 5);
        // Largest first
        assert_eq!(report.income.keys().next(), Some(OTHER_LABEL));
    }

    #[test]
    fn test_listing_by_label() {
        let mode = LabelFilter::exact("uber").unwrap();
        let listing = build_listing(&ledger(), TransactionKind::Income, &mode);

        assert_eq!(listing.count, 2);
        assert_eq!(listing.total_amount, 52.0);
        assert_eq!(listing.metadata.original_count, 4);
        assert_eq!(listing.metadata.filtered_count, 2);
        assert_eq!(listing.metadata.label.as_deref(), Some("uber"));
        assert_eq!(listing.records[0].id, "d1");
        assert_eq!(listing.records[0].label.as_deref(), Some("Uber"));
    }

    #[test]
    fn test_recent_newest_first() {
        let views = build_recent(&ledger(), &LabelFilter::Unfiltered, 3);
        let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["w2", "d3", "d2"]);
        assert_eq!(views[0].label, None);
    }

    #[test]
    fn test_dashboard_ignores_unlabeled_noise() {
        let summary = build_dashboard(&ledger(), now());
        // Uber 45 + Etsy 20 + old Uber tips 7 against Uber gas 15
        assert_eq!(summary.total_income, 72.0);
        assert_eq!(summary.total_expense, 15.0);
        assert_eq!(summary.net_income, 57.0);
        assert_eq!(summary.status, DashboardStatus::LookingGood);
        assert_eq!(summary.label_count, 2);
    }

    #[test]
    fn test_all_time_reports_include_pre_epoch_records() {
        let mut ledger = ledger();
        ledger.transactions.push(txn(
            "vintage",
            TransactionKind::Income,
            300,
            "Etsy vintage sale",
            Utc.with_ymd_and_hms(1968, 7, 1, 12, 0, 0).unwrap(),
        ));

        let summary = build_dashboard(&ledger, now());
        assert_eq!(summary.total_income, 75.0);
        assert_eq!(summary.income_count, 4);

        let mode = LabelFilter::exact("Etsy").unwrap();
        let report = build_analysis(&ledger, &mode, ReferenceTz::utc(), now());
        assert_eq!(report.metrics.total_income, 23.0);
    }

    #[test]
    fn test_metrics_growth_looks_past_a_short_range() {
        let range = DateRange::from_preset(RangePreset::Today, now(), ReferenceTz::utc());
        let mode = LabelFilter::exact("Uber").unwrap();
        let metrics = build_metrics(&ledger(), range, &mode, now());

        // Today only holds the 45.00 deposit, but growth still compares the
        // last 30 days (45.00) with the 30 before (7.00)
        assert_eq!(metrics.total_income, 45.0);
        assert_eq!(metrics.growth_pct, 542.86);
    }

    #[test]
    fn test_analysis_for_label() {
        let mode = LabelFilter::exact("Uber").unwrap();
        let report = build_analysis(&ledger(), &mode, ReferenceTz::utc(), now());

        assert_eq!(report.label, "Uber");
        assert_eq!(report.metrics.total_income, 52.0);
        assert_eq!(report.metrics.total_expense, 15.0);
        assert_eq!(report.metrics.income_count, 2);
        // Recent 30 days: 45, prior 30 days: 7
        assert_eq!(report.metrics.growth_pct, 542.86);
        assert_eq!(report.activity.hourly[9], 1);
        assert_eq!(report.activity.hourly.iter().sum::<u32>(), 2);
        assert_eq!(report.recent_transactions.len(), 3);
        assert_eq!(report.recent_transactions[0].id, "w1");
    }
}
