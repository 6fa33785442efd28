//! Error types for Nimbus.

use thiserror::Error;

/// Common error type for Nimbus.
#[derive(Error, Debug)]
pub enum NimbusError {
    /// Database error.
    ///
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// A unique constraint rejected the write.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Password hashing error.
    #[error("password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Token issuing error.
    #[error("token error: {0}")]
    Token(#[from] crate::auth::TokenError),

    /// Weather data source error.
    #[error("weather data error: {0}")]
    Weather(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for NimbusError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                NimbusError::Duplicate(db.message().to_string())
            }
            _ => NimbusError::Database(e.to_string()),
        }
    }
}

/// Result type alias for Nimbus operations.
pub type Result<T> = std::result::Result<T, NimbusError>;
