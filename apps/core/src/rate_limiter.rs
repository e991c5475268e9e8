use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Sliding-window limiter keyed by chat session id.
///
/// Owned by the assistant actor, so it needs no locking.
pub struct RateLimiter {
    /// Timestamps of accepted requests per session, oldest first.
    requests: HashMap<String, VecDeque<Instant>>,
    /// The maximum number of requests allowed within the `window`.
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            requests: HashMap::new(),
            limit,
            window,
        }
    }

    /// Record a request for `session_id` if it fits in the window.
    ///
    /// Returns `false` without recording anything when the session is over its limit.
    pub fn check(&mut self, session_id: &str) -> bool {
        self.check_at(session_id, Instant::now())
    }

    fn check_at(&mut self, session_id: &str, now: Instant) -> bool {
        let window = self.window;
        let timestamps = self.requests.entry(session_id.to_string()).or_default();

        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() < self.limit {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Requests `session_id` may still make in the current window.
    #[cfg(test)]
    fn remaining(&self, session_id: &str) -> usize {
        let now = Instant::now();
        let used = self.requests.get(session_id).map_or(0, |timestamps| {
            timestamps
                .iter()
                .filter(|&&t| now.duration_since(t) < self.window)
                .count()
        });
        self.limit.saturating_sub(used)
    }

    /// Drop sessions with no request inside the window. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let before = self.requests.len();
        self.requests.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|&last| now.duration_since(last) < window)
        });
        before - self.requests.len()
    }

    pub fn tracked_sessions(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
        for _ in 0..5 {
            assert!(limiter.check("session-1"));
        }
        assert!(!limiter.check("session-1"));
        assert_eq!(limiter.remaining("session-1"), 0);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
        assert_eq!(limiter.tracked_sessions(), 2);
    }

    #[test]
    fn test_rate_limiter_resets_after_window() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(50));
        assert!(limiter.check("session-2"));
        assert!(limiter.check("session-2"));
        assert!(!limiter.check("session-2"));

        thread::sleep(Duration::from_millis(60));

        assert!(limiter.check("session-2"));
    }

    #[test]
    fn test_window_slides_with_explicit_clock() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check_at("s", start));
        assert!(limiter.check_at("s", start + Duration::from_secs(5)));
        assert!(!limiter.check_at("s", start + Duration::from_secs(9)));
        // The first request has aged out, the second has not.
        assert!(limiter.check_at("s", start + Duration::from_secs(10)));
        assert!(!limiter.check_at("s", start + Duration::from_secs(11)));
    }

    #[test]
    fn test_prune_drops_idle_sessions() {
        let mut limiter = RateLimiter::new(3, Duration::from_millis(20));
        limiter.check("idle");
        thread::sleep(Duration::from_millis(30));
        limiter.check("active");

        assert_eq!(limiter.prune(), 1);
        assert_eq!(limiter.tracked_sessions(), 1);
        assert_eq!(limiter.remaining("active"), 2);
    }
}
