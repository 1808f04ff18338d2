use serde::{Deserialize, Serialize};

use crate::models::{Message, Update};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Optional so that a missing field yields the API's own 400 response
    /// rather than a deserialization rejection.
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

// -- Collections --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub name: String,
    pub text: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUpdateRequest {
    pub name: String,
    pub status: String,
    pub text: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePhotoRequest {
    pub data: String,
    pub caption: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePdfRequest {
    pub name: String,
    pub data: String,
    pub timestamp: Option<String>,
}

/// Delete reports rows actually removed; deleting a nonexistent id is not an
/// error, it reports 0.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

// -- Widget --

/// Combined feed for the display widget: both collections in one response,
/// or a single error for the whole fetch.
#[derive(Debug, Serialize)]
pub struct WidgetFeed {
    pub messages: Vec<Message>,
    pub updates: Vec<Update>,
}
