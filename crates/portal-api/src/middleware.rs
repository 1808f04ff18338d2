use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::ApiError;

/// Pull the bearer token out of the Authorization header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Gate for the authenticated API: the bearer token must name a live
/// session. Missing, unknown, and expired tokens all fail the same way,
/// before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match bearer_token(req.headers()) {
        Some(token) if state.sessions.is_valid(token) => Ok(next.run(req).await),
        _ => Err(ApiError::Unauthorized("Unauthorized. Please login.".into())),
    }
}
