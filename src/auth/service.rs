//! Registration, login and password change.
//!
//! [`AuthService`] coordinates the validator, the credential store, the
//! hasher and the token issuer. Every operation returns an [`Envelope`];
//! expected rejections are never errors.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::password::{CredentialHasher, PasswordError};
use super::token::TokenIssuer;
use super::validation::{CredentialValidator, Credentials, FieldViolation};
use crate::db::{User, UserRepositoryTrait};
use crate::envelope::{Envelope, MessageKey};
use crate::NimbusError;

/// Identity and token returned by a successful register or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

/// Secret hashed once to produce the decoy hash for unknown users.
const DECOY_SECRET: &str = "nimbus-decoy-credential";

/// Authentication orchestrator.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepositoryTrait>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
    validator: CredentialValidator,
    /// Hash verified against when no account matches, so unknown users
    /// cost the same as a wrong password.
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepositoryTrait>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        validator: CredentialValidator,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            validator,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Register a new user and issue a token.
    pub async fn register(&self, credentials: &Credentials) -> Envelope<AuthResponse> {
        let violations = self.validator.validate_registration(credentials);
        if !violations.is_empty() {
            log_violations("register", &violations);
            return Envelope::bad_request(MessageKey::ValidationFailed);
        }

        let username = credentials.username.as_str();
        match self.users.username_exists(username).await {
            Ok(true) => {
                info!(username, "Registration rejected: username taken");
                return Envelope::conflict(MessageKey::UsernameAlreadyExists);
            }
            Ok(false) => {}
            Err(e) => return internal("check username", e),
        }

        let hash = match self.hash(&credentials.password).await {
            Ok(hash) => hash,
            Err(e) => return internal("hash password", e),
        };

        let user = match User::new(username, hash) {
            Ok(user) => user,
            Err(e) => return internal("build user", NimbusError::Validation(e.to_string())),
        };

        match self.users.create(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration.
            Err(NimbusError::Duplicate(_)) => {
                info!(username, "Registration rejected: username taken");
                return Envelope::conflict(MessageKey::UsernameAlreadyExists);
            }
            Err(e) => return internal("create user", e),
        }

        match self.tokens.issue(&user) {
            Ok(token) => {
                info!(user_id = %user.id(), username, "User registered");
                Envelope::ok(
                    auth_response(&user, token),
                    MessageKey::UserRegisteredSuccessfully,
                )
            }
            Err(e) => internal("issue token", e.into()),
        }
    }

    /// Verify credentials and issue a token.
    pub async fn login(&self, credentials: &Credentials) -> Envelope<AuthResponse> {
        let violations = self.validator.validate_login(credentials);
        if !violations.is_empty() {
            log_violations("login", &violations);
            return Envelope::bad_request(MessageKey::ValidationFailed);
        }

        let username = credentials.username.as_str();
        let user = match self.users.get_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(username, "Login failed: unknown user");
                self.verify_decoy(&credentials.password).await;
                return Envelope::unauthorized(MessageKey::InvalidCredentials);
            }
            Err(e) => return internal("load user", e),
        };

        match self.verify(&credentials.password, user.password_hash()).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(username, "Login failed: wrong password");
                return Envelope::unauthorized(MessageKey::InvalidCredentials);
            }
            Err(e) => return internal("verify password", e),
        }

        match self.tokens.issue(&user) {
            Ok(token) => {
                info!(user_id = %user.id(), username, "User logged in");
                Envelope::ok(auth_response(&user, token), MessageKey::LoginSuccessful)
            }
            Err(e) => internal("issue token", e.into()),
        }
    }

    /// Replace the password of the live account `user_id` after verifying
    /// the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Envelope<()> {
        let violations = self
            .validator
            .validate_password_change(current_password, new_password);
        if !violations.is_empty() {
            log_violations("change_password", &violations);
            return Envelope::bad_request(MessageKey::ValidationFailed);
        }

        let user = match self.users.get_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(%user_id, "Password change failed: unknown user");
                self.verify_decoy(current_password).await;
                return Envelope::unauthorized(MessageKey::InvalidCredentials);
            }
            Err(e) => return internal("load user", e),
        };

        match self.verify(current_password, user.password_hash()).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%user_id, "Password change failed: wrong password");
                return Envelope::unauthorized(MessageKey::InvalidCredentials);
            }
            Err(e) => return internal("verify password", e),
        }

        let hash = match self.hash(new_password).await {
            Ok(hash) => hash,
            Err(e) => return internal("hash password", e),
        };
        let changed = match user.with_password_hash(hash) {
            Ok(changed) => changed,
            Err(e) => return internal("build user", NimbusError::Validation(e.to_string())),
        };

        match self.users.update(&changed).await {
            Ok(true) => {
                info!(%user_id, username = changed.username(), "Password changed");
                Envelope::done(MessageKey::PasswordChangedSuccessfully)
            }
            Ok(false) => {
                warn!(%user_id, "Password change failed: user vanished");
                Envelope::unauthorized(MessageKey::InvalidCredentials)
            }
            Err(e) => internal("update user", e),
        }
    }

    /// Runs the hasher on the blocking pool.
    async fn hash(&self, secret: &str) -> Result<String, NimbusError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))??;
        Ok(hash)
    }

    async fn verify(&self, secret: &str, hash: &str) -> Result<bool, NimbusError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_string();
        let hash = hash.to_string();
        let matched = tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(matched)
    }

    /// Runs a verification whose outcome is discarded.
    async fn verify_decoy(&self, secret: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash(DECOY_SECRET))
            .await;
        match decoy {
            Ok(hash) => {
                let _ = self.verify(secret, hash).await;
            }
            Err(e) => warn!("Decoy hash unavailable: {}", e),
        }
    }
}

fn auth_response(user: &User, token: String) -> AuthResponse {
    AuthResponse {
        user_id: user.id(),
        username: user.username().to_string(),
        token,
    }
}

fn log_violations(operation: &str, violations: &[FieldViolation]) {
    let codes: Vec<&str> = violations.iter().map(|v| v.code.as_str()).collect();
    info!(operation, ?codes, "Credential validation failed");
}

fn internal<T>(stage: &str, e: NimbusError) -> Envelope<T> {
    error!(stage, "Authentication failed unexpectedly: {}", e);
    Envelope::internal_error()
}
