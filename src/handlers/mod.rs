pub mod analysis;
pub mod categories;
pub mod dashboard;
pub mod labels;
pub mod metrics;
pub mod params;
pub mod summaries;
pub mod transactions;

use axum::http::Uri;
use axum::routing::{delete, get};
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Running totals
        .route("/api/accounts/:account_id/summaries", get(summaries::series))
        .route(
            "/api/accounts/:account_id/summaries/:period",
            get(summaries::combined_period),
        )
        .route(
            "/api/accounts/:account_id/deposits/summaries/:period",
            get(summaries::deposits_period),
        )
        .route(
            "/api/accounts/:account_id/withdrawals/summaries/:period",
            get(summaries::withdrawals_period),
        )
        // Breakdowns and figures
        .route(
            "/api/accounts/:account_id/categories",
            get(categories::breakdown),
        )
        .route("/api/accounts/:account_id/metrics", get(metrics::summary))
        .route("/api/accounts/:account_id/dashboard", get(dashboard::index))
        .route(
            "/api/accounts/:account_id/analysis",
            get(analysis::side_hustle),
        )
        // Records
        .route(
            "/api/accounts/:account_id/deposits",
            get(transactions::list_deposits).post(transactions::create_deposit),
        )
        .route(
            "/api/accounts/:account_id/withdrawals",
            get(transactions::list_withdrawals).post(transactions::create_withdrawal),
        )
        .route(
            "/api/accounts/:account_id/transactions",
            get(transactions::recent),
        )
        // Labels
        .route(
            "/api/accounts/:account_id/labels",
            get(labels::list).post(labels::create),
        )
        .route(
            "/api/accounts/:account_id/labels/:label",
            delete(labels::delete),
        )
}

async fn health() -> &'static str {
    "OK"
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
