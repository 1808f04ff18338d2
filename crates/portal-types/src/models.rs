use serde::{Deserialize, Serialize};

/// Stored record types — these map one-to-one onto SQLite rows and are
/// returned to clients as-is. `timestamp` is client-supplied (or server
/// stamped on create), `created_at` is always server stamped; both are
/// RFC 3339 text.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub timestamp: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub id: i64,
    pub name: String,
    /// One of `critical`, `urgent`, `notice`; anything else ranks below
    /// `notice` in the HTML widget. Stored verbatim.
    pub status: String,
    pub text: String,
    pub timestamp: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    /// Opaque encoded payload (base64 by convention). Never decoded.
    pub data: String,
    pub caption: String,
    pub timestamp: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pdf {
    pub id: i64,
    pub name: String,
    /// Opaque encoded payload, stored and returned verbatim.
    pub data: String,
    pub timestamp: String,
    pub created_at: String,
}
