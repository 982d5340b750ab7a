use axum::extract::{Path, Query, State};
use axum::response::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::params::ReportParams;
use crate::models::{AnalysisReport, LabelFilter};
use crate::services::report::build_analysis;
use crate::state::AppState;

/// Figures for one side hustle: metrics, when its income arrives, and its
/// latest transactions.
pub async fn side_hustle(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<AnalysisReport>> {
    let mode = match params.label_filter()? {
        mode @ LabelFilter::ExactLabel(_) => mode,
        _ => {
            return Err(AppError::InvalidQuery(
                "Analysis needs a side hustle: pass label=<name>".into(),
            ))
        }
    };
    let tz = params.timezone(&state)?;
    let as_of = params.now(&state)?;

    let ledger = state.load_ledger(&account_id).await?;
    let report = build_analysis(&ledger, &mode, tz, as_of);
    tracing::debug!(
        account_id = %account_id,
        label = %report.label,
        transactions = report.metrics.income_count + report.metrics.expense_count,
        "Built side hustle analysis"
    );
    Ok(Json(report))
}
