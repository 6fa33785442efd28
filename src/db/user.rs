//! User entity for Nimbus.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when constructing a [`User`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// Username is empty or whitespace.
    #[error("username must not be blank")]
    BlankUsername,

    /// Password hash is empty or whitespace.
    #[error("password hash must not be blank")]
    BlankPasswordHash,
}

/// A registered principal.
///
/// Username and password hash are never blank. Neither changes in place:
/// a password change produces a fresh value through
/// [`User::with_password_hash`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl User {
    /// Create a new user with a fresh identifier.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, UserError> {
        let username = username.into();
        let password_hash = password_hash.into();
        check_fields(&username, &password_hash)?;

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
            is_deleted: false,
        })
    }

    /// Rebuild a user from stored fields.
    pub(crate) fn restore(
        id: Uuid,
        username: String,
        password_hash: String,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
        is_deleted: bool,
    ) -> Result<Self, UserError> {
        check_fields(&username, &password_hash)?;
        Ok(Self {
            id,
            username,
            password_hash,
            created_at,
            updated_at,
            deleted_at,
            is_deleted,
        })
    }

    /// Same identity with a new password hash and a fresh update time.
    pub fn with_password_hash(&self, password_hash: impl Into<String>) -> Result<Self, UserError> {
        let password_hash = password_hash.into();
        check_fields(&self.username, &password_hash)?;

        Ok(Self {
            password_hash,
            updated_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Case-folded username used for uniqueness and lookup.
    pub fn normalized_username(&self) -> String {
        normalize_username(&self.username)
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

/// Fold `username` for comparison. Full Unicode lowercasing, so "Émile"
/// and "émile" are the same account.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase()
}

fn check_fields(username: &str, password_hash: &str) -> Result<(), UserError> {
    if username.trim().is_empty() {
        return Err(UserError::BlankUsername);
    }
    if password_hash.trim().is_empty() {
        return Err(UserError::BlankPasswordHash);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("alice", "$argon2id$hash").unwrap();
        assert_eq!(user.username(), "alice");
        assert_eq!(user.password_hash(), "$argon2id$hash");
        assert!(user.updated_at().is_none());
        assert!(user.deleted_at().is_none());
        assert!(!user.is_deleted());
    }

    #[test]
    fn test_new_user_unique_ids() {
        let a = User::new("alice", "hash").unwrap();
        let b = User::new("alice", "hash").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_blank_username_rejected() {
        assert_eq!(User::new("", "hash"), Err(UserError::BlankUsername));
        assert_eq!(User::new("   ", "hash"), Err(UserError::BlankUsername));
    }

    #[test]
    fn test_blank_hash_rejected() {
        assert_eq!(User::new("alice", ""), Err(UserError::BlankPasswordHash));
        assert_eq!(User::new("alice", " \t"), Err(UserError::BlankPasswordHash));
    }

    #[test]
    fn test_with_password_hash() {
        let user = User::new("alice", "old").unwrap();
        let changed = user.with_password_hash("new").unwrap();

        assert_eq!(changed.id(), user.id());
        assert_eq!(changed.username(), "alice");
        assert_eq!(changed.password_hash(), "new");
        assert_eq!(changed.created_at(), user.created_at());
        assert!(changed.updated_at().is_some());
        // Original value is untouched.
        assert_eq!(user.password_hash(), "old");
    }

    #[test]
    fn test_with_blank_password_hash() {
        let user = User::new("alice", "old").unwrap();
        assert_eq!(
            user.with_password_hash(""),
            Err(UserError::BlankPasswordHash)
        );
    }

    #[test]
    fn test_normalized_username_folds_unicode() {
        let user = User::new("ÉMILE", "hash").unwrap();
        assert_eq!(user.username(), "ÉMILE");
        assert_eq!(user.normalized_username(), "émile");
        assert_eq!(normalize_username("Émile"), normalize_username("éMILE"));
        assert_eq!(normalize_username("ΣΟΦΙΑ"), normalize_username("σοφια"));
    }
}
