use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{info, warn};

use portal_db::Database;
use portal_types::api::{
    HealthResponse, LoginRequest, LoginResponse, LogoutResponse, VerifyResponse,
};

use crate::error::ApiError;
use crate::guard::LoginGuard;
use crate::middleware::bearer_token;
use crate::now_iso;
use crate::sessions::SessionStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub sessions: SessionStore,
    pub guard: LoginGuard,
    pub password: String,
}

impl AppStateInner {
    pub fn new(db: Database, password: String) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            guard: LoginGuard::new(),
            password,
        }
    }
}

/// POST /api/login — checks run in a fixed order: lockout, presence,
/// correctness. The lockout answer never depends on the submitted password.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let ip = addr.ip();

    if state.guard.is_locked(ip) {
        warn!("login rejected for {}: locked out", ip);
        return Err(ApiError::LockedOut);
    }

    let password = req.password.unwrap_or_default();
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }

    if password != state.password {
        state.guard.record_attempt(ip, false);
        warn!("failed login attempt from {}", ip);
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }

    state.guard.record_attempt(ip, true);
    let (token, expires_in) = state.sessions.issue();
    info!("session issued for {}", ip);

    Ok(Json(LoginResponse { token, expires_in }))
}

/// POST /api/logout — revokes the presented token if any; always succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
    }
    Json(LogoutResponse { success: true })
}

/// GET /api/verify — 200 {valid:true} for a live session, 401 {valid:false}
/// otherwise.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let valid = bearer_token(&headers)
        .map(|t| state.sessions.is_valid(t))
        .unwrap_or(false);

    if valid {
        (StatusCode::OK, Json(VerifyResponse { valid: true }))
    } else {
        (StatusCode::UNAUTHORIZED, Json(VerifyResponse { valid: false }))
    }
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
    })
}
