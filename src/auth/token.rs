//! Bearer token issuing.
//!
//! Tokens are HS256 JWTs carrying the user id, username, a unique token id,
//! issuer, audience and validity window.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::db::User;

/// Token-related errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// No signing secret configured.
    #[error("token signing secret is not configured")]
    MissingSecret,

    /// Lifetime is zero or negative.
    #[error("token lifetime must be positive, got {0} minutes")]
    InvalidLifetime(i64),

    /// Signing failed.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Username.
    pub name: String,
    /// Unique token identifier.
    pub jti: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiration (seconds since the epoch).
    pub exp: i64,
}

/// Issues signed bearer tokens for verified identities.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a fresh token for `user`.
    fn issue(&self, user: &User) -> Result<String, TokenError>;
}

/// HS256 JWT implementation of [`TokenIssuer`].
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl JwtTokenIssuer {
    /// Build an issuer from configuration.
    ///
    /// An empty secret or non-positive lifetime is rejected here so the
    /// process fails at startup rather than per request.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret_key.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        if config.expiration_minutes <= 0 {
            return Err(TokenError::InvalidLifetime(config.expiration_minutes));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: Duration::minutes(config.expiration_minutes),
        })
    }

    fn claims_for(&self, user: &User) -> TokenClaims {
        let now = Utc::now();
        TokenClaims {
            sub: user.id().to_string(),
            name: user.username().to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<String, TokenError> {
        let claims = self.claims_for(user);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

impl std::fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
