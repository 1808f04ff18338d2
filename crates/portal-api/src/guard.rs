use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

pub const MAX_LOGIN_ATTEMPTS: u32 = 5;
pub const LOCKOUT_MINUTES: i64 = 15;

struct Attempt {
    count: u32,
    locked_until: Option<DateTime<Utc>>,
}

/// Per-address failed-login counter. Defends the single shared password
/// against brute force: 5 consecutive failures lock the address out for
/// 15 minutes. Tracking is per source IP, which is coarse (addresses behind
/// a shared NAT collide) but sufficient for a small private portal.
///
/// Like [`crate::sessions::SessionStore`], process-local and unpersisted.
#[derive(Default)]
pub struct LoginGuard {
    inner: Mutex<HashMap<IpAddr, Attempt>>,
}

impl LoginGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, addr: IpAddr) -> bool {
        self.is_locked_at(addr, Utc::now())
    }

    pub fn is_locked_at(&self, addr: IpAddr, now: DateTime<Utc>) -> bool {
        let mut map = self.lock();
        let Some((count, locked_until)) = map.get(&addr).map(|a| (a.count, a.locked_until)) else {
            return false;
        };
        match locked_until {
            None => false,
            // Lockout elapsed: purge lazily on this check.
            Some(until) if now >= until => {
                map.remove(&addr);
                false
            }
            Some(_) => count >= MAX_LOGIN_ATTEMPTS,
        }
    }

    pub fn record_attempt(&self, addr: IpAddr, success: bool) {
        self.record_attempt_at(addr, success, Utc::now());
    }

    pub fn record_attempt_at(&self, addr: IpAddr, success: bool, now: DateTime<Utc>) {
        let mut map = self.lock();
        if success {
            // Any success fully resets the counter.
            map.remove(&addr);
            return;
        }
        let attempt = map.entry(addr).or_insert(Attempt {
            count: 0,
            locked_until: None,
        });
        attempt.count += 1;
        // The window is stamped once, when the threshold is first reached.
        // Further failures while locked do not extend it (current policy,
        // kept as-is rather than reinterpreted as a sliding window).
        if attempt.count >= MAX_LOGIN_ATTEMPTS && attempt.locked_until.is_none() {
            attempt.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, Attempt>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn five_failures_lock_the_address() {
        let guard = LoginGuard::new();
        let now = Utc::now();
        for _ in 0..4 {
            guard.record_attempt_at(ip(1), false, now);
            assert!(!guard.is_locked_at(ip(1), now));
        }
        guard.record_attempt_at(ip(1), false, now);
        assert!(guard.is_locked_at(ip(1), now));
    }

    #[test]
    fn lockout_expires_after_fifteen_minutes() {
        let guard = LoginGuard::new();
        let now = Utc::now();
        for _ in 0..5 {
            guard.record_attempt_at(ip(2), false, now);
        }
        assert!(guard.is_locked_at(ip(2), now + Duration::minutes(14)));
        assert!(!guard.is_locked_at(ip(2), now + Duration::minutes(15)));
        // The elapsed record was purged; the counter starts over.
        guard.record_attempt_at(ip(2), false, now + Duration::minutes(16));
        assert!(!guard.is_locked_at(ip(2), now + Duration::minutes(16)));
    }

    #[test]
    fn success_resets_the_counter() {
        let guard = LoginGuard::new();
        let now = Utc::now();
        for _ in 0..4 {
            guard.record_attempt_at(ip(3), false, now);
        }
        guard.record_attempt_at(ip(3), true, now);
        for _ in 0..4 {
            guard.record_attempt_at(ip(3), false, now);
        }
        assert!(!guard.is_locked_at(ip(3), now));
    }

    #[test]
    fn failures_while_locked_do_not_extend_the_window() {
        let guard = LoginGuard::new();
        let now = Utc::now();
        for _ in 0..5 {
            guard.record_attempt_at(ip(4), false, now);
        }
        // More failures ten minutes in must not push the deadline out.
        guard.record_attempt_at(ip(4), false, now + Duration::minutes(10));
        assert!(!guard.is_locked_at(ip(4), now + Duration::minutes(15)));
    }

    #[test]
    fn addresses_are_tracked_independently() {
        let guard = LoginGuard::new();
        let now = Utc::now();
        for _ in 0..5 {
            guard.record_attempt_at(ip(5), false, now);
        }
        assert!(guard.is_locked_at(ip(5), now));
        assert!(!guard.is_locked_at(ip(6), now));
    }
}
