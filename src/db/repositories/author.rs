//! Author repository
//!
//! Minimal directory of the identities posts and comments reference.
//! Account management proper belongs to the external identity system.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Author;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Register an author record
    async fn create(&self, username: &str) -> Result<Author>;

    /// Get author by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Author>>;

    /// Check if an author exists
    async fn exists(&self, id: i64) -> Result<bool>;
}

/// SQLx-based author repository implementation
pub struct SqlxAuthorRepository {
    pool: DynDatabasePool,
}

impl SqlxAuthorRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, username: &str) -> Result<Author> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), username).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), username).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => exists_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => exists_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, username: &str) -> Result<Author> {
    let result = sqlx::query("INSERT INTO authors (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await
        .context("Failed to create author")?;

    let id = result.last_insert_rowid();

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Author not found after insert"))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Author>> {
    let row = sqlx::query("SELECT id, username, created_at FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get author by ID")?;

    Ok(row.map(|row| Author {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }))
}

async fn exists_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM authors WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check author existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, username: &str) -> Result<Author> {
    let result = sqlx::query("INSERT INTO authors (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await
        .context("Failed to create author")?;

    let id = result.last_insert_id() as i64;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Author not found after insert"))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Author>> {
    let row = sqlx::query("SELECT id, username, created_at FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get author by ID")?;

    Ok(row.map(|row| Author {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }))
}

async fn exists_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM authors WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check author existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}
