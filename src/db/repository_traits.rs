//! Credential store contract.
//!
//! Services depend on [`UserRepositoryTrait`] rather than on the sqlx
//! adapter, so they can be exercised against mocks.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::User;
use crate::Result;

/// Persistence operations for users.
///
/// Username lookups are case-insensitive and never return soft-deleted
/// users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Check if a live user holds `username`.
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Get a live user by username.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get a live user by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert a new user.
    ///
    /// Fails with `NimbusError::Duplicate` when a live user already holds
    /// the username.
    async fn create(&self, user: &User) -> Result<()>;

    /// Persist the mutable fields of an existing user.
    ///
    /// Returns `false` if no live user with that id exists.
    async fn update(&self, user: &User) -> Result<bool>;

    /// Mark a user as deleted. Returns `false` if no live user matched.
    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
}
