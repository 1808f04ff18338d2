use axum::{
    Json,
    extract::{Path, State},
};

use portal_types::api::{CreatePdfRequest, DeleteResponse};
use portal_types::models::Pdf;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::now_iso;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Pdf>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_pdfs()).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePdfRequest>,
) -> Result<Json<Pdf>, ApiError> {
    if req.name.is_empty() || req.data.is_empty() {
        return Err(ApiError::Validation("Name and data are required".into()));
    }

    let created_at = now_iso();
    let timestamp = req
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| created_at.clone());

    let db = state.clone();
    let record =
        blocking(move || db.db.insert_pdf(&req.name, &req.data, &timestamp, &created_at)).await?;
    Ok(Json(record))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let db = state.clone();
    let deleted = blocking(move || db.db.delete_pdf(id)).await?;
    Ok(Json(DeleteResponse { deleted }))
}
