pub mod auth;
pub mod error;
pub mod guard;
pub mod messages;
pub mod middleware;
pub mod pdfs;
pub mod photos;
pub mod router;
pub mod sessions;
pub mod updates;
pub mod widget;

pub use auth::{AppState, AppStateInner};
pub use router::router;

use chrono::{SecondsFormat, Utc};

/// Server timestamp in the same shape clients send: RFC 3339 with
/// millisecond precision, UTC.
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
