use axum::{
    Json,
    extract::{Path, State},
};

use portal_types::api::{CreatePhotoRequest, DeleteResponse};
use portal_types::models::Photo;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::now_iso;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Photo>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_photos()).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePhotoRequest>,
) -> Result<Json<Photo>, ApiError> {
    if req.data.is_empty() {
        return Err(ApiError::Validation("Photo data is required".into()));
    }

    let created_at = now_iso();
    let caption = req.caption.unwrap_or_default();
    let timestamp = req
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| created_at.clone());

    let db = state.clone();
    let record =
        blocking(move || db.db.insert_photo(&req.data, &caption, &timestamp, &created_at)).await?;
    Ok(Json(record))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let db = state.clone();
    let deleted = blocking(move || db.db.delete_photo(id)).await?;
    Ok(Json(DeleteResponse { deleted }))
}
