//! Key-value storage operations
//!
//! Mirrors the browser `localStorage` contract: string keys, string values,
//! whole-value replacement on every write.

use sqlx::SqlitePool;

use crate::{Error, Result};

/// Key holding the JSON array of recipe records
pub const RECIPES_KEY: &str = "recipes";

/// Key holding the JSON meal plan grid
pub const MEAL_PLAN_KEY: &str = "mealPlan";

/// Key holding the user token
pub const USER_ID_KEY: &str = "userId";

/// Handle to the `local_storage` table
///
/// Cheap to clone; clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a value, `None` when the key was never written
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT value FROM local_storage WHERE key = ?"
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|(value,)| value))
    }

    /// Write a value, replacing any previous one
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        tracing::trace!(key, bytes = value.len(), "local storage write");
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Drop every key
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// All keys currently stored, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
