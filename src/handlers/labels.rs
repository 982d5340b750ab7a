use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::LabelList;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LabelForm {
    #[serde(alias = "sidehustle", alias = "side_hustle")]
    pub label: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> AppResult<Json<LabelList>> {
    let labels = state.labels.list_labels(&account_id).await?;
    Ok(Json(LabelList::new(&account_id, labels)))
}

pub async fn create(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(form): Json<LabelForm>,
) -> AppResult<(StatusCode, Json<LabelList>)> {
    let label = form
        .label
        .ok_or_else(|| AppError::Validation("Label name is required".into()))?;
    let labels = state.labels.add_label(&account_id, &label).await?;
    Ok((StatusCode::CREATED, Json(LabelList::new(&account_id, labels))))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((account_id, label)): Path<(String, String)>,
) -> AppResult<Json<LabelList>> {
    let labels = state.labels.remove_label(&account_id, &label).await?;
    Ok(Json(LabelList::new(&account_id, labels)))
}
