//! Uniform outcome carrier for service operations.
//!
//! An [`Envelope`] is either a success with a payload or a failure
//! classified by [`Status`]. Both carry a [`MessageKey`]; display text is
//! resolved later by the transport through the message catalogue.

use std::fmt;

use serde::Serialize;

/// Outcome classification of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Operation succeeded.
    Ok,
    /// Input was structurally invalid.
    BadRequest,
    /// Credentials or token were rejected.
    Unauthorized,
    /// Resource already exists.
    Conflict,
    /// Resource does not exist.
    NotFound,
    /// Request rate exceeded.
    TooManyRequests,
    /// Unexpected failure.
    InternalError,
}

impl Status {
    /// Whether this status denotes success.
    pub fn is_success(self) -> bool {
        self == Status::Ok
    }
}

/// Keys into the message catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MessageKey {
    UserRegisteredSuccessfully,
    UsernameAlreadyExists,
    ValidationFailed,
    LoginSuccessful,
    InvalidCredentials,
    PasswordChangedSuccessfully,
    UsernameRequired,
    PasswordRequired,
    UsernameTooShort,
    UsernameTooLong,
    PasswordTooShort,
    CityRequired,
    WeatherNotFound,
    WeatherRetrievedSuccessfully,
    TooManyRequests,
    Unauthenticated,
    InternalError,
}

impl MessageKey {
    /// Catalogue key for this message.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::UserRegisteredSuccessfully => "UserRegisteredSuccessfully",
            MessageKey::UsernameAlreadyExists => "UsernameAlreadyExists",
            MessageKey::ValidationFailed => "ValidationFailed",
            MessageKey::LoginSuccessful => "LoginSuccessful",
            MessageKey::InvalidCredentials => "InvalidCredentials",
            MessageKey::PasswordChangedSuccessfully => "PasswordChangedSuccessfully",
            MessageKey::UsernameRequired => "UsernameRequired",
            MessageKey::PasswordRequired => "PasswordRequired",
            MessageKey::UsernameTooShort => "UsernameTooShort",
            MessageKey::UsernameTooLong => "UsernameTooLong",
            MessageKey::PasswordTooShort => "PasswordTooShort",
            MessageKey::CityRequired => "CityRequired",
            MessageKey::WeatherNotFound => "WeatherNotFound",
            MessageKey::WeatherRetrievedSuccessfully => "WeatherRetrievedSuccessfully",
            MessageKey::TooManyRequests => "TooManyRequests",
            MessageKey::Unauthenticated => "Unauthenticated",
            MessageKey::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success or classified failure, with an optional payload.
///
/// Fields are private so that a successful envelope always carries a
/// payload and a failed one never does.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    status: Status,
    data: Option<T>,
    message: MessageKey,
}

impl<T> Envelope<T> {
    /// Successful result carrying `data`.
    pub fn ok(data: T, message: MessageKey) -> Self {
        Self {
            status: Status::Ok,
            data: Some(data),
            message,
        }
    }

    fn failure(status: Status, message: MessageKey) -> Self {
        Self {
            status,
            data: None,
            message,
        }
    }

    pub fn bad_request(message: MessageKey) -> Self {
        Self::failure(Status::BadRequest, message)
    }

    pub fn unauthorized(message: MessageKey) -> Self {
        Self::failure(Status::Unauthorized, message)
    }

    pub fn conflict(message: MessageKey) -> Self {
        Self::failure(Status::Conflict, message)
    }

    pub fn not_found(message: MessageKey) -> Self {
        Self::failure(Status::NotFound, message)
    }

    pub fn too_many_requests() -> Self {
        Self::failure(Status::TooManyRequests, MessageKey::TooManyRequests)
    }

    pub fn internal_error() -> Self {
        Self::failure(Status::InternalError, MessageKey::InternalError)
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> MessageKey {
        self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the envelope, returning its payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Transform the payload, keeping status and message.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Envelope<U> {
        Envelope {
            status: self.status,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

impl Envelope<()> {
    /// Successful result without a meaningful payload.
    pub fn done(message: MessageKey) -> Self {
        Self::ok((), message)
    }
}
