//! Post repository
//!
//! Database operations for posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! `fetch_posts` executes a declarative `FilterSpec` and returns rows in
//! a stable order (`pub_date` descending, `id` descending on ties) so a
//! caller can re-fetch and slice the same sequence. Visibility rules are
//! not applied here; the services decide those.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CategoryRef, CreatePostInput, FilterSpec, LocationRef, Post, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post owned by `author_id`
    async fn create(&self, input: &CreatePostInput, author_id: i64) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Fetch posts matching the given scope, stably ordered
    async fn fetch_posts(&self, spec: &FilterSpec) -> Result<Vec<Post>>;

    /// Update a post
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Delete a post together with its comments
    async fn delete(&self, id: i64) -> Result<()>;

    /// Detach all posts from a category; returns the number of posts touched
    async fn detach_category(&self, category_id: i64) -> Result<u64>;

    /// Detach all posts from a location; returns the number of posts touched
    async fn detach_location(&self, location_id: i64) -> Result<u64>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput, author_id: i64) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_post_sqlite(self.pool.as_sqlite().unwrap(), input, author_id).await
            }
            DatabaseDriver::Mysql => {
                create_post_mysql(self.pool.as_mysql().unwrap(), input, author_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn fetch_posts(&self, spec: &FilterSpec) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => fetch_posts_sqlite(self.pool.as_sqlite().unwrap(), spec).await,
            DatabaseDriver::Mysql => fetch_posts_mysql(self.pool.as_mysql().unwrap(), spec).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_post_sqlite(self.pool.as_sqlite().unwrap(), id, input).await
            }
            DatabaseDriver::Mysql => update_post_mysql(self.pool.as_mysql().unwrap(), id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn detach_category(&self, category_id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                detach_category_sqlite(self.pool.as_sqlite().unwrap(), category_id).await
            }
            DatabaseDriver::Mysql => {
                detach_category_mysql(self.pool.as_mysql().unwrap(), category_id).await
            }
        }
    }

    async fn detach_location(&self, location_id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                detach_location_sqlite(self.pool.as_sqlite().unwrap(), location_id).await
            }
            DatabaseDriver::Mysql => {
                detach_location_mysql(self.pool.as_mysql().unwrap(), location_id).await
            }
        }
    }
}

// Shared SELECT clause: posts with their category/location summaries.
const SELECT_POSTS: &str = r#"
    SELECT p.id, p.author_id, p.title, p.text, p.pub_date, p.image,
           p.is_published, p.created_at,
           c.id AS category_id, c.slug AS category_slug,
           c.title AS category_title, c.is_published AS category_published,
           l.id AS location_id, l.name AS location_name,
           l.is_published AS location_published
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const STABLE_ORDER: &str = " ORDER BY p.pub_date DESC, p.id DESC";

fn scope_query(spec: &FilterSpec) -> String {
    match spec {
        FilterSpec::All => format!("{}{}", SELECT_POSTS, STABLE_ORDER),
        FilterSpec::ByAuthor(_) => {
            format!("{} WHERE p.author_id = ?{}", SELECT_POSTS, STABLE_ORDER)
        }
        FilterSpec::ByCategory(_) => format!("{} WHERE c.slug = ?{}", SELECT_POSTS, STABLE_ORDER),
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let category = row
        .get::<Option<i64>, _>("category_id")
        .map(|id| CategoryRef {
            id,
            slug: row.get("category_slug"),
            title: row.get("category_title"),
            is_published: row.get("category_published"),
        });
    let location = row
        .get::<Option<i64>, _>("location_id")
        .map(|id| LocationRef {
            id,
            name: row.get("location_name"),
            is_published: row.get("location_published"),
        });

    Ok(Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        image: row.get("image"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        category,
        location,
    })
}

async fn create_post_sqlite(
    pool: &SqlitePool,
    input: &CreatePostInput,
    author_id: i64,
) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (author_id, title, text, pub_date, image, is_published, category_id, location_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author_id)
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.pub_date)
    .bind(&input.image)
    .bind(input.is_published)
    .bind(input.category_id)
    .bind(input.location_id)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_rowid();

    get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.id = ?", SELECT_POSTS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_posts_sqlite(pool: &SqlitePool, spec: &FilterSpec) -> Result<Vec<Post>> {
    let sql = scope_query(spec);
    let query = sqlx::query(&sql);
    let query = match spec {
        FilterSpec::All => query,
        FilterSpec::ByAuthor(author_id) => query.bind(*author_id),
        FilterSpec::ByCategory(slug) => query.bind(slug.clone()),
    };

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_sqlite(&row)?);
    }

    Ok(posts)
}

async fn update_post_sqlite(pool: &SqlitePool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found"))?;

    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_text = input.text.as_ref().unwrap_or(&existing.text);
    let new_pub_date = input.pub_date.unwrap_or(existing.pub_date);
    let new_category_id = match &input.category_id {
        Some(v) => *v,
        None => existing.category.as_ref().map(|c| c.id),
    };
    let new_location_id = match &input.location_id {
        Some(v) => *v,
        None => existing.location.as_ref().map(|l| l.id),
    };
    let new_image = match &input.image {
        Some(v) => v.clone(),
        None => existing.image.clone(),
    };
    let new_is_published = input.is_published.unwrap_or(existing.is_published);

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, image = ?, is_published = ?, category_id = ?, location_id = ?
        WHERE id = ?
        "#,
    )
    .bind(new_title)
    .bind(new_text)
    .bind(new_pub_date)
    .bind(&new_image)
    .bind(new_is_published)
    .bind(new_category_id)
    .bind(new_location_id)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    // Comments go first; the schema carries no ON DELETE CASCADE.
    sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post comments")?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn detach_category_sqlite(pool: &SqlitePool, category_id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE posts SET category_id = NULL WHERE category_id = ?")
        .bind(category_id)
        .execute(pool)
        .await
        .context("Failed to detach posts from category")?;

    Ok(result.rows_affected())
}

async fn detach_location_sqlite(pool: &SqlitePool, location_id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE posts SET location_id = NULL WHERE location_id = ?")
        .bind(location_id)
        .execute(pool)
        .await
        .context("Failed to detach posts from location")?;

    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let category = row
        .get::<Option<i64>, _>("category_id")
        .map(|id| CategoryRef {
            id,
            slug: row.get("category_slug"),
            title: row.get("category_title"),
            is_published: row.get("category_published"),
        });
    let location = row
        .get::<Option<i64>, _>("location_id")
        .map(|id| LocationRef {
            id,
            name: row.get("location_name"),
            is_published: row.get("location_published"),
        });

    Ok(Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        image: row.get("image"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        category,
        location,
    })
}

async fn create_post_mysql(
    pool: &MySqlPool,
    input: &CreatePostInput,
    author_id: i64,
) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (author_id, title, text, pub_date, image, is_published, category_id, location_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author_id)
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.pub_date)
    .bind(&input.image)
    .bind(input.is_published)
    .bind(input.category_id)
    .bind(input.location_id)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_id() as i64;

    get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.id = ?", SELECT_POSTS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_posts_mysql(pool: &MySqlPool, spec: &FilterSpec) -> Result<Vec<Post>> {
    let sql = scope_query(spec);
    let query = sqlx::query(&sql);
    let query = match spec {
        FilterSpec::All => query,
        FilterSpec::ByAuthor(author_id) => query.bind(*author_id),
        FilterSpec::ByCategory(slug) => query.bind(slug.clone()),
    };

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_mysql(&row)?);
    }

    Ok(posts)
}

async fn update_post_mysql(pool: &MySqlPool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found"))?;

    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_text = input.text.as_ref().unwrap_or(&existing.text);
    let new_pub_date = input.pub_date.unwrap_or(existing.pub_date);
    let new_category_id = match &input.category_id {
        Some(v) => *v,
        None => existing.category.as_ref().map(|c| c.id),
    };
    let new_location_id = match &input.location_id {
        Some(v) => *v,
        None => existing.location.as_ref().map(|l| l.id),
    };
    let new_image = match &input.image {
        Some(v) => v.clone(),
        None => existing.image.clone(),
    };
    let new_is_published = input.is_published.unwrap_or(existing.is_published);

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, image = ?, is_published = ?, category_id = ?, location_id = ?
        WHERE id = ?
        "#,
    )
    .bind(new_title)
    .bind(new_text)
    .bind(new_pub_date)
    .bind(&new_image)
    .bind(new_is_published)
    .bind(new_category_id)
    .bind(new_location_id)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    // Comments go first; the schema carries no ON DELETE CASCADE.
    sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post comments")?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn detach_category_mysql(pool: &MySqlPool, category_id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE posts SET category_id = NULL WHERE category_id = ?")
        .bind(category_id)
        .execute(pool)
        .await
        .context("Failed to detach posts from category")?;

    Ok(result.rows_affected())
}

async fn detach_location_mysql(pool: &MySqlPool, location_id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE posts SET location_id = NULL WHERE location_id = ?")
        .bind(location_id)
        .execute(pool)
        .await
        .context("Failed to detach posts from location")?;

    Ok(result.rows_affected())
}
