use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{messages, pdfs, photos, updates, widget};

/// Assemble the full route table: public auth endpoints, the session-gated
/// CRUD surface, and the unauthenticated widget views.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/verify", get(auth::verify))
        .route("/api/health", get(auth::health))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/messages", get(messages::list).post(messages::create))
        .route("/api/messages/{id}", delete(messages::remove))
        .route("/api/updates", get(updates::list).post(updates::create))
        .route("/api/updates/{id}", delete(updates::remove))
        .route("/api/photos", get(photos::list).post(photos::create))
        .route("/api/photos/{id}", delete(photos::remove))
        .route("/api/pdfs", get(pdfs::list).post(pdfs::create))
        .route("/api/pdfs/{id}", delete(pdfs::remove))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state.clone());

    let widgets = Router::new()
        .route("/widget/messages", get(widget::messages))
        .route("/widget/updates", get(widget::updates))
        .route("/widget/all", get(widget::all))
        .route("/widget/updates/html", get(widget::updates_html))
        .with_state(state);

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(widgets)
        // Photo/PDF payloads arrive base64-encoded in JSON bodies.
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        // The widget consumer polls; nothing here may be cached.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
