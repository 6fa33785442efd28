//! Request DTOs for Web API.

use serde::Deserialize;

pub use crate::auth::Credentials;

/// Registration request.
pub type RegisterRequest = Credentials;

/// Login request.
pub type LoginRequest = Credentials;

/// Password change request.
///
/// Missing fields deserialize as empty strings and are rejected by the
/// credential validator.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// Query string of `GET /api/weather`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}
