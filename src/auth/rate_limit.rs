use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Fixed-window attempt counter for the login endpoint, one window per
/// submitted email. The window does not slide: a full window followed by a
/// boundary reset permits a short burst, which is accepted imprecision for
/// a brute-force brake. State lives only in this process and is gone on
/// restart.
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: Mutex<HashMap<String, AttemptWindow>>,
}

struct AttemptWindow {
    count: u32,
    window_started_at: Instant,
}

impl LoginRateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt for `key` and report whether it may proceed.
    ///
    /// The whole read-modify-write happens under one lock so concurrent
    /// logins for the same key never under-count. A denied attempt does not
    /// extend the window.
    pub fn check_and_record(&self, key: &str, now: Instant) -> bool {
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match attempts.get_mut(key) {
            None => {
                attempts.insert(
                    key.to_string(),
                    AttemptWindow {
                        count: 1,
                        window_started_at: now,
                    },
                );
                true
            }
            Some(window) if now.duration_since(window.window_started_at) > self.window => {
                window.count = 1;
                window.window_started_at = now;
                true
            }
            Some(window) if window.count >= self.max_attempts => false,
            Some(window) => {
                window.count += 1;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter() -> LoginRateLimiter {
        LoginRateLimiter::new(5, Duration::from_secs(15 * 60))
    }

    #[test]
    fn allows_up_to_max_then_denies() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_and_record("a@b.c", now));
        }
        assert!(!limiter.check_and_record("a@b.c", now));
        assert!(!limiter.check_and_record("a@b.c", now));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = limiter();
        let start = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_and_record("a@b.c", start));
        }
        assert!(!limiter.check_and_record("a@b.c", start));

        let later = start + Duration::from_secs(15 * 60 + 1);
        assert!(limiter.check_and_record("a@b.c", later));
        // Fresh window: four more attempts fit before the brake engages.
        for _ in 0..4 {
            assert!(limiter.check_and_record("a@b.c", later));
        }
        assert!(!limiter.check_and_record("a@b.c", later));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_and_record("a@b.c", now));
        }
        assert!(!limiter.check_and_record("a@b.c", now));
        assert!(limiter.check_and_record("x@y.z", now));
    }

    #[test]
    fn concurrent_attempts_never_undercount() {
        let limiter = Arc::new(limiter());
        let now = Instant::now();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.check_and_record("a@b.c", now))
            })
            .collect();

        let allowed = handles
            .into_iter()
            .filter(|h| matches!(h.join(), Ok(true)))
            .count();

        assert_eq!(allowed, 5);
    }
}
