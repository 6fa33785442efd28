//! Authentication handlers.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::web::dto::{envelope_response, ChangePasswordRequest, JsonBody, LoginRequest, RegisterRequest};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/auth/register - Create an account and return a token.
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Response {
    let result = state.auth.register(&req).await;
    envelope_response(result, state.localizer.as_ref())
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Response {
    let result = state.auth.login(&req).await;
    envelope_response(result, state.localizer.as_ref())
}

/// POST /api/auth/change-password - Replace the caller's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Response {
    // The account is addressed by id; names can be reused after deletion.
    let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
        tracing::warn!(sub = %claims.sub, "Token subject is not a user id");
        return ApiError::unauthorized(Some(state.localizer.as_ref())).into_response();
    };
    let result = state
        .auth
        .change_password(user_id, &req.current_password, &req.new_password)
        .await;
    envelope_response(result, state.localizer.as_ref())
}
