//! User repository for Nimbus.
//!
//! sqlx/SQLite implementation of [`UserRepositoryTrait`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::repository_traits::UserRepositoryTrait;
use super::user::{normalize_username, User};
use crate::{NimbusError, Result};

/// Repository for user persistence.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new UserRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by ID, including soft-deleted ones.
    pub async fn get_by_id_with_deleted(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at, updated_at, deleted_at, is_deleted
             FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    /// Count live users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| NimbusError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_normalized = ? AND is_deleted = 0)",
        )
        .bind(normalize_username(username))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at, updated_at, deleted_at, is_deleted
             FROM users WHERE username_normalized = ? AND is_deleted = 0",
        )
        .bind(normalize_username(username))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at, updated_at, deleted_at, is_deleted
             FROM users WHERE id = ? AND is_deleted = 0",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn create(&self, user: &User) -> Result<()> {
        // `?` keeps unique violations distinguishable as Duplicate.
        sqlx::query(
            "INSERT INTO users (id, username, username_normalized, password_hash,
                                created_at, updated_at, deleted_at, is_deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id().to_string())
        .bind(user.username())
        .bind(user.normalized_username())
        .bind(user.password_hash())
        .bind(user.created_at())
        .bind(user.updated_at())
        .bind(user.deleted_at())
        .bind(user.is_deleted())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = ?
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(user.password_hash())
        .bind(user.updated_at().unwrap_or_else(Utc::now))
        .bind(user.id().to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_deleted = 1, deleted_at = ?
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| NimbusError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Internal struct for mapping database rows to User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| NimbusError::Database(format!("invalid user id {}: {e}", self.id)))?;

        User::restore(
            id,
            self.username,
            self.password_hash,
            self.created_at,
            self.updated_at,
            self.deleted_at,
            self.is_deleted,
        )
        .map_err(|e| NimbusError::Database(format!("corrupt user row {id}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_repo() -> (Database, UserRepository) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());
        (db, repo)
    }

    #[tokio::test]
    async fn test_create_and_get_by_username() {
        let (_db, repo) = setup_repo().await;

        let user = User::new("alice", "hash-1").unwrap();
        repo.create(&user).await.unwrap();

        let found = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id(), user.id());
        assert_eq!(found.username(), "alice");
        assert_eq!(found.password_hash(), "hash-1");
        assert!(!found.is_deleted());
    }

    #[tokio::test]
    async fn test_get_by_username_case_insensitive() {
        let (_db, repo) = setup_repo().await;
        repo.create(&User::new("Alice", "hash").unwrap()).await.unwrap();

        let found = repo.get_by_username("ALICE").await.unwrap().unwrap();
        assert_eq!(found.username(), "Alice");
        assert!(repo.username_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_username_case_folding_beyond_ascii() {
        let (_db, repo) = setup_repo().await;
        repo.create(&User::new("Émile", "hash").unwrap()).await.unwrap();

        assert!(repo.username_exists("émile").await.unwrap());
        let found = repo.get_by_username("ÉMILE").await.unwrap().unwrap();
        assert_eq!(found.username(), "Émile");

        let result = repo.create(&User::new("émile", "other").unwrap()).await;
        assert!(matches!(result, Err(NimbusError::Duplicate(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_username_not_found() {
        let (_db, repo) = setup_repo().await;
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
        assert!(!repo.username_exists("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let (_db, repo) = setup_repo().await;
        repo.create(&User::new("alice", "hash").unwrap()).await.unwrap();

        let result = repo.create(&User::new("ALICE", "other").unwrap()).await;
        assert!(matches!(result, Err(NimbusError::Duplicate(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "hash").unwrap();
        repo.create(&user).await.unwrap();

        let found = repo.get_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(found.username(), "alice");
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_skips_deleted() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "hash").unwrap();
        repo.create(&user).await.unwrap();
        repo.soft_delete(user.id()).await.unwrap();

        assert!(repo.get_by_id(user.id()).await.unwrap().is_none());
        assert!(repo.get_by_id_with_deleted(user.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "old").unwrap();
        repo.create(&user).await.unwrap();

        let changed = user.with_password_hash("new").unwrap();
        assert!(repo.update(&changed).await.unwrap());

        let found = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password_hash(), "new");
        assert!(found.updated_at().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_db, repo) = setup_repo().await;
        let ghost = User::new("ghost", "hash").unwrap();
        assert!(!repo.update(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "hash").unwrap();
        repo.create(&user).await.unwrap();

        assert!(repo.soft_delete(user.id()).await.unwrap());
        assert!(repo.get_by_username("alice").await.unwrap().is_none());
        assert!(!repo.username_exists("alice").await.unwrap());

        // Row is retained as a tombstone.
        let tombstone = repo.get_by_id_with_deleted(user.id()).await.unwrap().unwrap();
        assert!(tombstone.is_deleted());
        assert!(tombstone.deleted_at().is_some());

        // Deleting again matches nothing.
        assert!(!repo.soft_delete(user.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_delete_frees_username() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "hash").unwrap();
        repo.create(&user).await.unwrap();
        repo.soft_delete(user.id()).await.unwrap();

        let again = User::new("alice", "hash-2").unwrap();
        repo.create(&again).await.unwrap();

        let found = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id(), again.id());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_soft_deleted_user() {
        let (_db, repo) = setup_repo().await;
        let user = User::new("alice", "hash").unwrap();
        repo.create(&user).await.unwrap();
        repo.soft_delete(user.id()).await.unwrap();

        let changed = user.with_password_hash("new").unwrap();
        assert!(!repo.update(&changed).await.unwrap());
    }
}
