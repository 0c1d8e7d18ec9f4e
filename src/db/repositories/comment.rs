//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment on a post
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        input: &CreateCommentInput,
    ) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// List comments of a post, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Update a comment's text
    async fn update_text(&self, id: i64, text: &str) -> Result<Comment>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count comments of a single post
    async fn count_by_post(&self, post_id: i64) -> Result<i64>;

    /// Count comments for a batch of posts; posts without comments are absent
    async fn count_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        input: &CreateCommentInput,
    ) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), post_id, author_id, input).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), post_id, author_id, input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_post_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => list_by_post_mysql(self.pool.as_mysql().unwrap(), post_id).await,
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_text_sqlite(self.pool.as_sqlite().unwrap(), id, text).await
            }
            DatabaseDriver::Mysql => update_text_mysql(self.pool.as_mysql().unwrap(), id, text).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_post_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => {
                count_by_post_mysql(self.pool.as_mysql().unwrap(), post_id).await
            }
        }
    }

    async fn count_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_for_posts_sqlite(self.pool.as_sqlite().unwrap(), post_ids).await
            }
            DatabaseDriver::Mysql => {
                count_for_posts_mysql(self.pool.as_mysql().unwrap(), post_ids).await
            }
        }
    }
}

/// Build `?, ?, ...` for an IN clause of the given arity
fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 3);
    for i in 0..n {
        if i > 0 {
            s.push_str(", ");
        }
        s.push('?');
    }
    s
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}

async fn create_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    input: &CreateCommentInput,
) -> Result<Comment> {
    let result = sqlx::query("INSERT INTO comments (post_id, author_id, text) VALUES (?, ?, ?)")
        .bind(post_id)
        .bind(author_id)
        .bind(&input.text)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    let id = result.last_insert_rowid();

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after insert"))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query("SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.map(|row| row_to_comment_sqlite(&row)))
}

async fn list_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, post_id, author_id, text, created_at
        FROM comments
        WHERE post_id = ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_sqlite).collect())
}

async fn update_text_sqlite(pool: &SqlitePool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

async fn count_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(row.get("count"))
}

async fn count_for_posts_sqlite(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, i64>> {
    let query = format!(
        "SELECT post_id, COUNT(*) AS count FROM comments WHERE post_id IN ({}) GROUP BY post_id",
        placeholders(post_ids.len())
    );

    let mut q = sqlx::query(&query);
    for id in post_ids {
        q = q.bind(*id);
    }

    let rows = q
        .fetch_all(pool)
        .await
        .context("Failed to count comments for posts")?;

    Ok(rows
        .iter()
        .map(|row| (row.get("post_id"), row.get("count")))
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}

async fn create_mysql(
    pool: &MySqlPool,
    post_id: i64,
    author_id: i64,
    input: &CreateCommentInput,
) -> Result<Comment> {
    let result = sqlx::query("INSERT INTO comments (post_id, author_id, text) VALUES (?, ?, ?)")
        .bind(post_id)
        .bind(author_id)
        .bind(&input.text)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    let id = result.last_insert_id() as i64;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after insert"))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query("SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.map(|row| row_to_comment_mysql(&row)))
}

async fn list_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, post_id, author_id, text, created_at
        FROM comments
        WHERE post_id = ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_mysql).collect())
}

async fn update_text_mysql(pool: &MySqlPool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

async fn count_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(row.get("count"))
}

async fn count_for_posts_mysql(pool: &MySqlPool, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
    let query = format!(
        "SELECT post_id, COUNT(*) AS count FROM comments WHERE post_id IN ({}) GROUP BY post_id",
        placeholders(post_ids.len())
    );

    let mut q = sqlx::query(&query);
    for id in post_ids {
        q = q.bind(*id);
    }

    let rows = q
        .fetch_all(pool)
        .await
        .context("Failed to count comments for posts")?;

    Ok(rows
        .iter()
        .map(|row| (row.get("post_id"), row.get("count")))
        .collect())
}
