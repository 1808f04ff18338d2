use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{Duration, Utc};
use tracing::info;

use portal_db::Database;
use portal_types::api::{CreateUpdateRequest, DeleteResponse};
use portal_types::models::Update;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::now_iso;

/// Retention cap: the updates table never holds more than this many rows
/// after an insert.
pub const MAX_UPDATES: u32 = 10;

/// Updates whose timestamp is older than this are purged on read and by the
/// hourly background sweep.
pub const UPDATE_EXPIRY_HOURS: i64 = 48;

/// Age-based purge against the 48 h cutoff. Idempotent; safe to run from
/// reads and the background sweep in any interleaving.
pub fn prune_expired(db: &Database) -> anyhow::Result<usize> {
    db.prune_expired_updates(Utc::now() - Duration::hours(UPDATE_EXPIRY_HOURS))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Update>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || {
        let pruned = prune_expired(&db.db)?;
        if pruned > 0 {
            info!("pruned {} expired updates", pruned);
        }
        db.db.list_updates(MAX_UPDATES)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUpdateRequest>,
) -> Result<Json<Update>, ApiError> {
    if req.name.is_empty() || req.status.is_empty() || req.text.is_empty() {
        return Err(ApiError::Validation(
            "Name, status, and text are required".into(),
        ));
    }

    let created_at = now_iso();
    let timestamp = req
        .timestamp
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| created_at.clone());

    let db = state.clone();
    let record = blocking(move || {
        let record =
            db.db
                .insert_update(&req.name, &req.status, &req.text, &timestamp, &created_at)?;
        // Cap holds immediately after every successful insert.
        let trimmed = db.db.cap_updates(MAX_UPDATES)?;
        if trimmed > 0 {
            info!("removed {} updates over the {}-row cap", trimmed, MAX_UPDATES);
        }
        Ok(record)
    })
    .await?;
    Ok(Json(record))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let db = state.clone();
    let deleted = blocking(move || db.db.delete_update(id)).await?;
    Ok(Json(DeleteResponse { deleted }))
}
