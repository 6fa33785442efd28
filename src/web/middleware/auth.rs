//! JWT authentication middleware.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;

use crate::auth::TokenClaims;
use crate::config::JwtConfig;
use crate::i18n::Localizer;
use crate::web::error::ApiError;

/// Verification settings for bearer tokens.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a JWT state checking signature, issuer, audience and expiry.
    pub fn new(config: &JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            decoding_key,
            validation,
        }
    }

    /// Decode and verify a token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Extractor for authenticated users.
///
/// Rejects with 401 `Unauthenticated` when the bearer token is missing,
/// malformed, expired or signed for another issuer or audience.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let localizer = parts.extensions.get::<Arc<dyn Localizer>>().cloned();
        let unauthorized = || ApiError::unauthorized(localizer.as_deref());

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(unauthorized)?;

        // Set by `jwt_auth`.
        let jwt_state = parts.extensions.get::<Arc<JwtState>>().ok_or_else(|| {
            tracing::error!("JWT state missing from request extensions");
            ApiError::internal(localizer.as_deref())
        })?;

        let claims = jwt_state.verify(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized()
        })?;

        Ok(AuthUser(claims))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
