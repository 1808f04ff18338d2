use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

/// Sessions live for 24 hours from issuance, absolute.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// In-memory session authority. Tokens are opaque 256-bit random strings;
/// expiry is enforced lazily on first access past the deadline, so an
/// expired token is never valid again even without a sweeper.
///
/// Process-local by design: a restart invalidates all sessions, which is
/// acceptable under the 24 h TTL and single-shared-secret login model.
/// Multi-instance deployments would need an external shared store.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token. Returns the token and its lifetime in seconds.
    pub fn issue(&self) -> (String, i64) {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> (String, i64) {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.lock()
            .insert(token.clone(), now + Duration::seconds(SESSION_TTL_SECS));
        (token, SESSION_TTL_SECS)
    }

    /// Absent token ⇒ false. Expired ⇒ purge the entry and return false.
    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Utc::now())
    }

    pub fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let mut map = self.lock();
        let Some(&expires_at) = map.get(token) else {
            return false;
        };
        if now > expires_at {
            map.remove(token);
            return false;
        }
        true
    }

    /// Unconditional removal; a no-op if the token is unknown.
    pub fn revoke(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        // A poisoned lock only means some holder panicked; the map itself
        // is still coherent for these single-step operations.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_valid_immediately_after_issue() {
        let store = SessionStore::new();
        let (token, expires_in) = store.issue();
        assert_eq!(expires_in, 86400);
        assert_eq!(token.len(), 64); // 32 bytes hex-encoded
        assert!(store.is_valid(&token));
    }

    #[test]
    fn token_expires_after_24_hours() {
        let store = SessionStore::new();
        let start = Utc::now();
        let (token, _) = store.issue_at(start);

        assert!(store.is_valid_at(&token, start + Duration::hours(23)));
        assert!(!store.is_valid_at(&token, start + Duration::hours(24) + Duration::seconds(1)));
        // Expiry purged the entry: the token never comes back, even if the
        // clock were to run backwards.
        assert!(!store.is_valid_at(&token, start));
    }

    #[test]
    fn revoke_invalidates_and_is_idempotent() {
        let store = SessionStore::new();
        let (token, _) = store.issue();
        store.revoke(&token);
        assert!(!store.is_valid(&token));
        store.revoke(&token); // no-op
        assert!(!store.is_valid(&token));
    }

    #[test]
    fn tokens_are_unique() {
        let store = SessionStore::new();
        let (a, _) = store.issue();
        let (b, _) = store.issue();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_token_is_invalid() {
        let store = SessionStore::new();
        assert!(!store.is_valid("deadbeef"));
        assert!(!store.is_valid(""));
    }
}
