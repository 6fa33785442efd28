//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header::RETRY_AFTER, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use mockable::Clock;
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use crate::config::RateLimitConfig;
use crate::i18n::Localizer;
use crate::rate_limit::{FixedWindowLimiter, RateLimitResult};
use crate::web::error::ApiError;

/// Limiters applied in front of the API routes.
pub struct RateLimitState {
    /// Global fixed window for the weather route.
    weather: FixedWindowLimiter,
    /// Per-IP throttle for register and login.
    login: DefaultKeyedRateLimiter<String>,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let per_minute = NonZeroU32::new(config.login_rate_limit).unwrap_or(NonZeroU32::MIN);
        Self {
            weather: FixedWindowLimiter::from_config(config, clock),
            login: RateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    /// Count a weather request against the global window.
    pub fn check_weather(&self) -> RateLimitResult {
        self.weather.check()
    }

    /// Check if a register or login request is allowed for the given IP.
    pub fn check_login(&self, ip: &str) -> bool {
        self.login.check_key(&ip.to_string()).is_ok()
    }

    /// Drop per-IP state that has fully replenished.
    pub fn cleanup(&self) {
        self.login.retain_recent();
        self.login.shrink_to_fit();
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
                tracing::debug!(tracked_ips = self.login.len(), "Login throttle cleaned up");
            }
        });
    }
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Try X-Forwarded-For header first (for reverse proxy)
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn localizer(req: &Request<Body>) -> Option<Arc<dyn Localizer>> {
    req.extensions().get::<Arc<dyn Localizer>>().cloned()
}

/// Whole seconds until `retry_after` elapses, at least one.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

/// Fixed-window limiting for the weather route.
///
/// Runs before authentication, so rejected and unauthenticated requests
/// both count against the window.
pub async fn weather_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match state.check_weather() {
        RateLimitResult::Allowed { .. } => next.run(req).await,
        RateLimitResult::Denied { retry_after } => {
            tracing::warn!(ip = %get_client_ip(&req), "Weather rate limit exceeded");
            let mut response = ApiError::too_many_requests(localizer(&req).as_deref())
                .into_response();
            response.headers_mut().insert(
                RETRY_AFTER,
                HeaderValue::from(retry_after_secs(retry_after)),
            );
            response
        }
    }
}

/// Rate limiting middleware for register and login.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_login(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return ApiError::too_many_requests(localizer(&req).as_deref()).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;

    fn state(permit_limit: u32, login_rate_limit: u32) -> RateLimitState {
        let config = RateLimitConfig {
            permit_limit,
            window_secs: 60,
            login_rate_limit,
        };
        RateLimitState::new(&config, Arc::new(MutableClock::at_minute_boundary()))
    }

    #[test]
    fn test_weather_window() {
        let state = state(2, 30);

        assert!(state.check_weather().is_allowed());
        assert!(state.check_weather().is_allowed());
        assert!(!state.check_weather().is_allowed());
    }

    #[test]
    fn test_login_rate_limit() {
        let state = state(10, 3);

        assert!(state.check_login("127.0.0.1"));
        assert!(state.check_login("127.0.0.1"));
        assert!(state.check_login("127.0.0.1"));

        // 4th request should fail
        assert!(!state.check_login("127.0.0.1"));

        // Different IP should work
        assert!(state.check_login("192.168.1.1"));
    }

    #[test]
    fn test_retry_after_secs() {
        assert_eq!(retry_after_secs(Duration::from_secs(45)), 45);
        assert_eq!(retry_after_secs(Duration::from_millis(44_200)), 45);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn test_get_client_ip_forwarded() {
        let req = Request::builder()
            .header("X-Forwarded-For", "10.0.0.1, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_ip(&req), "10.0.0.1");
    }

    #[test]
    fn test_get_client_ip_unknown() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_client_ip(&req), "unknown");
    }
}
