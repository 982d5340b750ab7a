use axum::extract::{Path, Query, State};
use axum::response::Json;

use crate::date_utils::RangePreset;
use crate::error::AppResult;
use crate::handlers::params::ReportParams;
use crate::models::CategoryReport;
use crate::services::report::build_categories;
use crate::state::AppState;

/// Income and expense totals per side hustle, unmatched ones under `Other`.
pub async fn breakdown(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<CategoryReport>> {
    let tz = params.timezone(&state)?;
    let now = params.now(&state)?;
    let range = params.date_range(RangePreset::All, now, tz, true)?;
    let mode = params.label_filter()?;

    let ledger = state.load_ledger(&account_id).await?;
    Ok(Json(build_categories(&ledger, range, &mode)))
}
