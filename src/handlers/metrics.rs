use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::date_utils::RangePreset;
use crate::error::AppResult;
use crate::handlers::params::ReportParams;
use crate::models::{Metrics, TimeRangeView};
use crate::services::report::build_metrics;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub label_filter: String,
    pub as_of: DateTime<Utc>,
    pub time_range: TimeRangeView,
    pub skipped_records: usize,
}

pub async fn summary(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<MetricsResponse>> {
    let tz = params.timezone(&state)?;
    let as_of = params.now(&state)?;
    let range = params.date_range(RangePreset::All, as_of, tz, true)?;
    let mode = params.label_filter()?;

    let ledger = state.load_ledger(&account_id).await?;
    Ok(Json(MetricsResponse {
        metrics: build_metrics(&ledger, range, &mode, as_of),
        label_filter: mode.to_string(),
        as_of,
        time_range: (&range).into(),
        skipped_records: ledger.skipped,
    }))
}
