//! Fixed-window in-memory rate limiter.
//!
//! Each key gets a counter and a window deadline. The first call in a
//! window creates the entry; later calls increment the counter until the
//! maximum, after which calls are denied until the window expires. A
//! background task sweeps expired entries once a minute.
//!
//! State is process-local, which is acceptable only while the service
//! runs as a single instance.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How often the background sweeper runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    /// Whether the call may proceed.
    pub allowed: bool,
    /// Calls left in the current window.
    pub remaining: u32,
    /// Time until the current window resets.
    pub retry_after: Duration,
}

/// Fixed-window counter keyed by an identifier string.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a call against `key`, allowing at most `max` calls per
    /// `window`.
    pub fn check(&self, key: &str, max: u32, window: Duration) -> Decision {
        self.check_at(Instant::now(), key, max, window)
    }

    fn check_at(&self, now: Instant, key: &str, max: u32, window: Duration) -> Decision {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = entries.get_mut(key);
        match entry {
            None => {
                entries.insert(
                    key.to_owned(),
                    Entry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                Decision {
                    allowed: true,
                    remaining: max.saturating_sub(1),
                    retry_after: window,
                }
            }
            Some(entry) if now > entry.reset_at => {
                // Window expired: start a fresh one
                *entry = Entry {
                    count: 1,
                    reset_at: now + window,
                };
                Decision {
                    allowed: true,
                    remaining: max.saturating_sub(1),
                    retry_after: window,
                }
            }
            Some(entry) if entry.count >= max => Decision {
                allowed: false,
                remaining: 0,
                retry_after: entry.reset_at.saturating_duration_since(now),
            },
            Some(entry) => {
                entry.count += 1;
                Decision {
                    allowed: true,
                    remaining: max.saturating_sub(entry.count),
                    retry_after: entry.reset_at.saturating_duration_since(now),
                }
            }
        }
    }

    /// Drop expired entries, returning how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.reset_at);
        before - entries.len()
    }
}

/// Build a rate limit key from an action and an identifier.
///
/// The identifier is lowercased so `User@Example.com` and
/// `user@example.com` share a bucket.
#[must_use]
pub fn key(action: &str, identifier: &str) -> String {
    format!("{action}:{}", identifier.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    #[test]
    fn test_allows_up_to_max_within_window() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for attempt in 1..=3 {
            let decision = limiter.check_at(now, "login:a@b.c", 3, WINDOW);
            assert!(decision.allowed, "attempt {attempt}");
            assert_eq!(decision.remaining, 3 - attempt);
        }
    }

    #[test]
    fn test_denies_call_past_max() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at(now, "login:a@b.c", 3, WINDOW).allowed);
        }

        let denied = limiter.check_at(now, "login:a@b.c", 3, WINDOW);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after, WINDOW);
    }

    #[test]
    fn test_allows_first_call_after_window_expiry() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at(start, "login:a@b.c", 3, WINDOW);
        }
        assert!(!limiter.check_at(start, "login:a@b.c", 3, WINDOW).allowed);

        let later = start + WINDOW + Duration::from_secs(1);
        let decision = limiter.check_at(later, "login:a@b.c", 3, WINDOW);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.check_at(now, "login:a@b.c", 1, WINDOW).allowed);
        assert!(!limiter.check_at(now, "login:a@b.c", 1, WINDOW).allowed);

        // Other identifiers and other actions are unaffected
        assert!(limiter.check_at(now, "login:x@y.z", 1, WINDOW).allowed);
        assert!(limiter.check_at(now, "register:a@b.c", 1, WINDOW).allowed);
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        limiter.check_at(start, "old", 5, Duration::from_secs(10));
        limiter.check_at(start, "fresh", 5, Duration::from_secs(3600));

        let removed = limiter.sweep_at(start + Duration::from_secs(60));
        assert_eq!(removed, 1);

        // The fresh entry kept its count
        let decision = limiter.check_at(start + Duration::from_secs(60), "fresh", 5, WINDOW);
        assert_eq!(decision.remaining, 3);
    }

    #[test]
    fn test_key_lowercases_identifier() {
        assert_eq!(key("login", "User@Example.COM"), "login:user@example.com");
    }
}
