use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::params::ReportParams;
use crate::models::{
    NewRecord, NewTransactionForm, RawRecord, RecordListing, TransactionKind, TransactionView,
};
use crate::services::report::{build_listing, build_recent};
use crate::services::snapshot::Ledger;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedRecord {
    pub message: String,
    pub kind: TransactionKind,
    pub record: RawRecord,
}

#[derive(Debug, Serialize)]
pub struct RecentTransactions {
    pub account_id: String,
    pub label: Option<String>,
    pub transactions: Vec<TransactionView>,
    pub count: usize,
}

async fn list(
    state: &AppState,
    account_id: &str,
    params: &ReportParams,
    kind: TransactionKind,
) -> AppResult<RecordListing> {
    let mode = params.label_filter()?;
    let ledger = Ledger::load_kind(
        state.source.as_ref(),
        state.labels.as_ref(),
        account_id,
        kind,
    )
    .await?;
    Ok(build_listing(&ledger, kind, &mode))
}

async fn create(
    state: &AppState,
    account_id: &str,
    form: NewTransactionForm,
    kind: TransactionKind,
) -> AppResult<(StatusCode, Json<CreatedRecord>)> {
    let record = NewRecord::from_form(form, kind, state.now())?;
    let created = state.source.create(account_id, kind, &record).await?;
    tracing::info!(
        account_id,
        kind = kind.source_name(),
        amount = record.amount,
        "Recorded new transaction"
    );

    let message = match kind {
        TransactionKind::Income => "Deposit created successfully",
        TransactionKind::Expense => "Withdrawal created successfully",
    };
    Ok((
        StatusCode::CREATED,
        Json(CreatedRecord {
            message: message.into(),
            kind,
            record: created,
        }),
    ))
}

pub async fn list_deposits(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<RecordListing>> {
    list(&state, &account_id, &params, TransactionKind::Income)
        .await
        .map(Json)
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<RecordListing>> {
    list(&state, &account_id, &params, TransactionKind::Expense)
        .await
        .map(Json)
}

pub async fn create_deposit(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(form): Json<NewTransactionForm>,
) -> AppResult<(StatusCode, Json<CreatedRecord>)> {
    create(&state, &account_id, form, TransactionKind::Income).await
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(form): Json<NewTransactionForm>,
) -> AppResult<(StatusCode, Json<CreatedRecord>)> {
    create(&state, &account_id, form, TransactionKind::Expense).await
}

/// Newest transactions of both kinds.
pub async fn recent(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<RecentTransactions>> {
    let limit = params.limit()?;
    let mode = params.label_filter()?;

    let ledger = state.load_ledger(&account_id).await?;
    let transactions = build_recent(&ledger, &mode, limit);
    Ok(Json(RecentTransactions {
        label: mode.label().map(|l| l.name().to_string()),
        count: transactions.len(),
        transactions,
        account_id,
    }))
}
