use axum::{
    Json,
    extract::{Path, State},
};

use portal_types::api::{CreateMessageRequest, DeleteResponse};
use portal_types::models::Message;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::now_iso;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_messages()).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    if req.name.is_empty() || req.text.is_empty() {
        return Err(ApiError::Validation("Name and text are required".into()));
    }

    let created_at = now_iso();
    let timestamp = req
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| created_at.clone());

    let db = state.clone();
    let record =
        blocking(move || db.db.insert_message(&req.name, &req.text, &timestamp, &created_at))
            .await?;
    Ok(Json(record))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let db = state.clone();
    let deleted = blocking(move || db.db.delete_message(id)).await?;
    Ok(Json(DeleteResponse { deleted }))
}
