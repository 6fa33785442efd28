//! Authentication module for Nimbus.
//!
//! Password hashing, token issuing, credential validation and the
//! orchestrating [`AuthService`].

mod password;
mod service;
mod token;
pub mod validation;

pub use password::{Argon2Hasher, CredentialHasher, PasswordError};
pub use service::{AuthResponse, AuthService};
pub use token::{JwtTokenIssuer, TokenClaims, TokenError, TokenIssuer};
pub use validation::{CredentialValidator, Credentials, FieldViolation};
