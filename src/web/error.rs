//! HTTP mapping of envelope outcomes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::EnvelopeBody;
use crate::envelope::{MessageKey, Status};
use crate::i18n::Localizer;

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => StatusCode::OK,
            Status::BadRequest => StatusCode::BAD_REQUEST,
            Status::Unauthorized => StatusCode::UNAUTHORIZED,
            Status::Conflict => StatusCode::CONFLICT,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Status::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Request rejected before reaching a service.
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    key: MessageKey,
    message: String,
}

impl ApiError {
    /// Create an error whose message is resolved through `localizer`.
    pub fn new(status: Status, key: MessageKey, localizer: Option<&dyn Localizer>) -> Self {
        let message = localizer
            .map(|l| l.resolve(key))
            .unwrap_or_else(|| key.as_str().to_string());
        Self {
            status,
            key,
            message,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(localizer: Option<&dyn Localizer>) -> Self {
        Self::new(Status::BadRequest, MessageKey::ValidationFailed, localizer)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(localizer: Option<&dyn Localizer>) -> Self {
        Self::new(Status::Unauthorized, MessageKey::Unauthenticated, localizer)
    }

    /// Create a rate limit error.
    pub fn too_many_requests(localizer: Option<&dyn Localizer>) -> Self {
        Self::new(Status::TooManyRequests, MessageKey::TooManyRequests, localizer)
    }

    /// Create an internal server error.
    pub fn internal(localizer: Option<&dyn Localizer>) -> Self {
        Self::new(Status::InternalError, MessageKey::InternalError, localizer)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn key(&self) -> MessageKey {
        self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(self.status);
        let body = EnvelopeBody::<()>::failure(self.status, self.key, self.message);
        (status, Json(body)).into_response()
    }
}
