//! Database schema and migrations for Nimbus.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id              TEXT PRIMARY KEY,       -- UUID v4
    username        TEXT NOT NULL,          -- as registered
    username_normalized TEXT NOT NULL,      -- Unicode lowercase of username
    password_hash   TEXT NOT NULL,          -- Argon2id PHC string
    created_at      TEXT NOT NULL,
    updated_at      TEXT,
    deleted_at      TEXT,
    is_deleted      INTEGER NOT NULL DEFAULT 0
);

-- Live usernames are unique regardless of case; tombstones free the name.
-- SQLite only folds ASCII, so case folding happens before the write.
CREATE UNIQUE INDEX idx_users_username_live
    ON users(username_normalized)
    WHERE is_deleted = 0;
"#,
];
