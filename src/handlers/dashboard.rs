use axum::extract::{Path, Query, State};
use axum::response::Json;

use crate::error::AppResult;
use crate::handlers::params::ReportParams;
use crate::models::DashboardSummary;
use crate::services::report::build_dashboard;
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DashboardSummary>> {
    let now = params.now(&state)?;
    let ledger = state.load_ledger(&account_id).await?;
    Ok(Json(build_dashboard(&ledger, now)))
}
