use axum::extract::{Path, Query, State};
use axum::response::Json;

use crate::date_utils::RangePreset;
use crate::error::{AppError, AppResult};
use crate::handlers::params::ReportParams;
use crate::models::{AggregationResult, Granularity, SeriesView, TransactionKind};
use crate::services::report::{build_series, SeriesQuery};
use crate::state::AppState;

/// Legacy chart periods: `day` is today by hour, `week` is this week by
/// weekday, `month` is this month by week.
fn shortcut(period: &str) -> AppResult<(Granularity, RangePreset)> {
    match period.to_ascii_lowercase().as_str() {
        "day" => Ok((Granularity::Hour, RangePreset::Today)),
        "week" => Ok((Granularity::Day, RangePreset::ThisWeek)),
        "month" => Ok((Granularity::Week, RangePreset::ThisMonth)),
        _ => Err(AppError::InvalidQuery(format!(
            "Unknown summary period '{}'. Use: day, week, month",
            period
        ))),
    }
}

async fn run(
    state: &AppState,
    account_id: &str,
    params: &ReportParams,
    granularity: Granularity,
    default_range: RangePreset,
    view: SeriesView,
) -> AppResult<AggregationResult> {
    let tz = params.timezone(state)?;
    let now = params.now(state)?;
    let range = params.date_range(default_range, now, tz, false)?;
    let query = SeriesQuery::new(granularity, range, tz, view, params.label_filter()?)?;

    let ledger = state.load_ledger(account_id).await?;
    let result = build_series(&ledger, &query);
    tracing::debug!(
        account_id,
        buckets = result.metadata.buckets,
        transactions = result.metadata.transaction_count,
        "Built running totals"
    );
    Ok(result)
}

/// Running totals for any granularity/range/view combination.
pub async fn series(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<AggregationResult>> {
    let granularity = params.granularity(Granularity::Hour)?;
    let view = params.view(SeriesView::Combined)?;
    let default_range = match granularity {
        Granularity::Hour => RangePreset::Today,
        Granularity::Day => RangePreset::ThisWeek,
        Granularity::Week | Granularity::Month => RangePreset::ThisMonth,
    };
    run(&state, &account_id, &params, granularity, default_range, view)
        .await
        .map(Json)
}

pub async fn combined_period(
    State(state): State<AppState>,
    Path((account_id, period)): Path<(String, String)>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<AggregationResult>> {
    let (granularity, range) = shortcut(&period)?;
    let view = params.view(SeriesView::Combined)?;
    run(&state, &account_id, &params, granularity, range, view)
        .await
        .map(Json)
}

async fn kind_period(
    state: &AppState,
    account_id: &str,
    period: &str,
    params: &ReportParams,
    kind: TransactionKind,
) -> AppResult<Json<AggregationResult>> {
    let (granularity, range) = shortcut(period)?;
    run(state, account_id, params, granularity, range, SeriesView::for_kind(kind))
        .await
        .map(Json)
}

pub async fn deposits_period(
    State(state): State<AppState>,
    Path((account_id, period)): Path<(String, String)>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<AggregationResult>> {
    kind_period(&state, &account_id, &period, &params, TransactionKind::Income).await
}

pub async fn withdrawals_period(
    State(state): State<AppState>,
    Path((account_id, period)): Path<(String, String)>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<AggregationResult>> {
    kind_period(&state, &account_id, &period, &params, TransactionKind::Expense).await
}
