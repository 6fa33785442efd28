//! Password hashing for Nimbus.
//!
//! Uses Argon2id with per-hash random salts. Hashes are PHC strings that
//! embed the algorithm, parameters and salt, so verification does not need
//! the hasher's configured costs.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::config::HashingConfig;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Argon2 rejected the cost parameters.
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

/// One-way hashing and verification of secrets.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted hash of `secret`.
    fn hash(&self, secret: &str) -> Result<String, PasswordError>;

    /// Whether `secret` matches `hash`. Malformed hashes never match.
    fn verify(&self, secret: &str, hash: &str) -> bool;
}

/// Argon2id implementation of [`CredentialHasher`].
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the default costs (64 MiB, 3 iterations, 4 lanes).
    pub fn new() -> Result<Self, PasswordError> {
        Self::from_config(&HashingConfig::default())
    }

    /// Hasher with the configured costs.
    pub fn from_config(config: &HashingConfig) -> Result<Self, PasswordError> {
        Self::with_params(config.memory_kib, config.iterations, config.parallelism)
    }

    /// Hasher with explicit Argon2 costs.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, secret: &str, hash: &str) -> bool {
        verify_password(secret, hash).is_ok()
    }
}

/// Check `password` against a PHC hash. Costs come from the hash itself.
fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}
