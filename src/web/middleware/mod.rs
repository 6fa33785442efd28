//! Middleware for Web API.

pub mod auth;
pub mod locale;
pub mod rate_limit;

pub use auth::{jwt_auth, AuthUser, JwtState};
pub use locale::inject_localizer;
pub use rate_limit::{login_rate_limit, weather_rate_limit, RateLimitState};
