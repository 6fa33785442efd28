//! Fixed-window request rate limiting.
//!
//! A single counter covers all callers. Windows are aligned to multiples of
//! the window length since the Unix epoch, so a 60 second window always
//! starts on a whole minute.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mockable::Clock;

use crate::config::RateLimitConfig;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// Request is denied due to rate limit.
    Denied {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

#[derive(Debug)]
struct WindowState {
    window_start_ms: i64,
    count: u32,
}

/// Global fixed-window limiter.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use mockable::DefaultClock;
/// use nimbus::rate_limit::FixedWindowLimiter;
///
/// let limiter = FixedWindowLimiter::new(2, Duration::from_secs(3600), Arc::new(DefaultClock));
/// let first = limiter.check();
/// assert!(first.is_allowed());
/// ```
pub struct FixedWindowLimiter {
    permit_limit: u32,
    window_ms: i64,
    state: Mutex<WindowState>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    /// Create a limiter accepting `permit_limit` requests per `window`.
    ///
    /// Windows shorter than a millisecond are treated as one millisecond.
    pub fn new(permit_limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX).max(1);
        Self {
            permit_limit,
            window_ms,
            state: Mutex::new(WindowState {
                window_start_ms: i64::MIN,
                count: 0,
            }),
            clock,
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.permit_limit, config.window(), clock)
    }

    /// Count a request against the current window.
    ///
    /// Accepted requests are counted exactly once; denied requests are not
    /// counted.
    pub fn check(&self) -> RateLimitResult {
        let now_ms = self.clock.utc().timestamp_millis();
        let window_start_ms = now_ms - now_ms.rem_euclid(self.window_ms);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.window_start_ms != window_start_ms {
            state.window_start_ms = window_start_ms;
            state.count = 0;
        }

        if state.count < self.permit_limit {
            state.count += 1;
            RateLimitResult::Allowed {
                remaining: self.permit_limit - state.count,
            }
        } else {
            let left_ms = window_start_ms.saturating_add(self.window_ms) - now_ms;
            RateLimitResult::Denied {
                retry_after: Duration::from_millis(u64::try_from(left_ms).unwrap_or(0)),
            }
        }
    }

    pub fn permit_limit(&self) -> u32 {
        self.permit_limit
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms as u64)
    }
}

impl std::fmt::Debug for FixedWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWindowLimiter")
            .field("permit_limit", &self.permit_limit)
            .field("window_ms", &self.window_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;

    fn limiter(limit: u32, clock: &MutableClock) -> FixedWindowLimiter {
        FixedWindowLimiter::new(limit, Duration::from_secs(60), Arc::new(clock.clone()))
    }

    #[test]
    fn test_allows_up_to_limit() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = limiter(10, &clock);

        for i in 0..10 {
            assert_eq!(
                limiter.check(),
                RateLimitResult::Allowed { remaining: 9 - i }
            );
        }
    }

    #[test]
    fn test_denies_over_limit() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = limiter(10, &clock);

        for _ in 0..10 {
            assert!(limiter.check().is_allowed());
        }
        clock.advance_secs(15);

        match limiter.check() {
            RateLimitResult::Denied { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(45));
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn test_denied_requests_not_counted() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = limiter(1, &clock);

        assert!(limiter.check().is_allowed());
        for _ in 0..5 {
            assert!(!limiter.check().is_allowed());
        }
        clock.advance_secs(60);
        assert_eq!(limiter.check(), RateLimitResult::Allowed { remaining: 0 });
    }

    #[test]
    fn test_resets_at_window_boundary() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = limiter(2, &clock);

        clock.advance_secs(59);
        assert!(limiter.check().is_allowed());
        assert!(limiter.check().is_allowed());
        assert!(!limiter.check().is_allowed());

        // One second later a new aligned window begins.
        clock.advance_secs(1);
        assert!(limiter.check().is_allowed());
    }

    #[test]
    fn test_window_is_wall_clock_aligned() {
        let clock = MutableClock::at_minute_boundary();
        clock.advance_secs(30);
        let limiter = limiter(1, &clock);

        assert!(limiter.check().is_allowed());
        // Still the same window 29 seconds later.
        clock.advance_secs(29);
        assert!(!limiter.check().is_allowed());
        // Next window starts at the minute, not 60 seconds after first use.
        clock.advance_secs(1);
        assert!(limiter.check().is_allowed());
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = limiter(0, &clock);
        assert!(!limiter.check().is_allowed());
    }

    #[test]
    fn test_from_config() {
        let clock = MutableClock::at_minute_boundary();
        let config = RateLimitConfig {
            permit_limit: 3,
            window_secs: 10,
            login_rate_limit: 30,
        };
        let limiter = FixedWindowLimiter::from_config(&config, Arc::new(clock));
        assert_eq!(limiter.permit_limit(), 3);
        assert_eq!(limiter.window(), Duration::from_secs(10));
    }

    #[test]
    fn test_exact_count_under_contention() {
        let clock = MutableClock::at_minute_boundary();
        let limiter = Arc::new(limiter(50, &clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..20).filter(|_| limiter.check().is_allowed()).count())
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
