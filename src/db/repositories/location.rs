//! Location repository
//!
//! Same delete semantics as categories: referencing posts are detached,
//! never removed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateLocationInput, Location};

/// Location repository trait
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Create a new location
    async fn create(&self, input: &CreateLocationInput) -> Result<Location>;

    /// Get location by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List all locations ordered by name
    async fn list(&self) -> Result<Vec<Location>>;

    /// Set the publication flag
    async fn set_published(&self, id: i64, is_published: bool) -> Result<bool>;

    /// Delete a location, detaching its posts first
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based location repository implementation
pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, input: &CreateLocationInput) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_published_sqlite(self.pool.as_sqlite().unwrap(), id, is_published).await
            }
            DatabaseDriver::Mysql => {
                set_published_mysql(self.pool.as_mysql().unwrap(), id, is_published).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

async fn create_sqlite(pool: &SqlitePool, input: &CreateLocationInput) -> Result<Location> {
    let result = sqlx::query("INSERT INTO locations (name, is_published) VALUES (?, ?)")
        .bind(&input.name)
        .bind(input.is_published)
        .execute(pool)
        .await
        .context("Failed to create location")?;

    let id = result.last_insert_rowid();

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found after insert"))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.map(|row| row_to_location_sqlite(&row)))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Location>> {
    let rows =
        sqlx::query("SELECT id, name, is_published, created_at FROM locations ORDER BY name ASC")
            .fetch_all(pool)
            .await
            .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_sqlite).collect())
}

async fn set_published_sqlite(pool: &SqlitePool, id: i64, is_published: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE locations SET is_published = ? WHERE id = ?")
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update location publication")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    // Detach referencing posts first; the FK has no ON DELETE action.
    sqlx::query("UPDATE posts SET location_id = NULL WHERE location_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to detach posts from location")?;

    let result = sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn row_to_location_mysql(row: &sqlx::mysql::MySqlRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

async fn create_mysql(pool: &MySqlPool, input: &CreateLocationInput) -> Result<Location> {
    let result = sqlx::query("INSERT INTO locations (name, is_published) VALUES (?, ?)")
        .bind(&input.name)
        .bind(input.is_published)
        .execute(pool)
        .await
        .context("Failed to create location")?;

    let id = result.last_insert_id() as i64;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found after insert"))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.map(|row| row_to_location_mysql(&row)))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Location>> {
    let rows =
        sqlx::query("SELECT id, name, is_published, created_at FROM locations ORDER BY name ASC")
            .fetch_all(pool)
            .await
            .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_mysql).collect())
}

async fn set_published_mysql(pool: &MySqlPool, id: i64, is_published: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE locations SET is_published = ? WHERE id = ?")
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update location publication")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    // Detach referencing posts first; the FK has no ON DELETE action.
    sqlx::query("UPDATE posts SET location_id = NULL WHERE location_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to detach posts from location")?;

    let result = sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(result.rows_affected() > 0)
}
