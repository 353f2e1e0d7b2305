//! Local user record store (sqlite via sqlx)
//!
//! Single `user_data` table used by the demo fetch/delete paths. Every
//! statement binds its arguments; no SQL is ever assembled from input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

/// A row of the `user_data` table.
///
/// Intentionally free of PII columns; the table only exists to exercise
/// the query paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pooled sqlite store for user records.
#[derive(Clone, Debug)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub async fn connect(path: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests and dry runs.
    ///
    /// A single connection keeps every query on the same database.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_data (
                id INTEGER PRIMARY KEY,
                username TEXT,
                created_at TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a single user by id with a bound parameter.
    pub async fn fetch_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        debug!(user_id, "executing parameterized user fetch");
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, created_at FROM user_data WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Insert a user, returning the generated id.
    pub async fn insert_user(&self, username: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO user_data (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete a user by id with a bound parameter, returning rows affected.
    pub async fn delete_user(&self, user_id: i64) -> Result<u64> {
        debug!(user_id, "executing parameterized user delete");
        let result = sqlx::query("DELETE FROM user_data WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Number of rows currently in the table.
    pub async fn count_users(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let store = UserStore::connect_in_memory().await.expect("store");
        let id = store.insert_user("alice").await.expect("insert");

        let record = store.fetch_user(id).await.expect("fetch").expect("row");
        assert_eq!(record.id, id);
        assert_eq!(record.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn fetch_missing_user_returns_none() {
        let store = UserStore::connect_in_memory().await.expect("store");
        let record = store.fetch_user(9999).await.expect("fetch");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn binding_preserves_sql_metacharacters() {
        let store = UserStore::connect_in_memory().await.expect("store");

        // A username that would break string-built SQL must round-trip
        // intact and must not touch other rows.
        let hostile = "bobby'; DROP TABLE user_data; --";
        let innocent = store.insert_user("carol").await.expect("insert");
        let id = store.insert_user(hostile).await.expect("insert");

        let record = store.fetch_user(id).await.expect("fetch").expect("row");
        assert_eq!(record.username.as_deref(), Some(hostile));
        assert_eq!(store.count_users().await.expect("count"), 2);
        assert!(store.fetch_user(innocent).await.expect("fetch").is_some());
    }

    #[tokio::test]
    async fn delete_removes_exactly_the_bound_id() {
        let store = UserStore::connect_in_memory().await.expect("store");
        let keep = store.insert_user("keep").await.expect("insert");
        let drop = store.insert_user("drop").await.expect("insert");

        let affected = store.delete_user(drop).await.expect("delete");
        assert_eq!(affected, 1);
        assert!(store.fetch_user(drop).await.expect("fetch").is_none());
        assert!(store.fetch_user(keep).await.expect("fetch").is_some());

        // Deleting again is a no-op, not an error
        let affected = store.delete_user(drop).await.expect("delete");
        assert_eq!(affected, 0);
    }
}
