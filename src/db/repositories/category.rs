//! Category repository
//!
//! Deleting a category first detaches the posts that reference it; the
//! posts survive with no category.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CreateCategoryInput};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories ordered by title
    async fn list(&self) -> Result<Vec<Category>>;

    /// Set the publication flag
    async fn set_published(&self, id: i64, is_published: bool) -> Result<bool>;

    /// Delete a category, detaching its posts first
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await,
            DatabaseDriver::Mysql => get_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
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

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => exists_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        description: row.get("description"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

async fn create_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<Category> {
    let result = sqlx::query(
        "INSERT INTO categories (slug, title, description, is_published) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.is_published)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    let id = result.last_insert_rowid();

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after insert"))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories ORDER BY title ASC",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn set_published_sqlite(pool: &SqlitePool, id: i64, is_published: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE categories SET is_published = ? WHERE id = ?")
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update category publication")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    // Detach referencing posts first; the FK has no ON DELETE action.
    sqlx::query("UPDATE posts SET category_id = NULL WHERE category_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to detach posts from category")?;

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check category slug")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        description: row.get("description"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

async fn create_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<Category> {
    let result = sqlx::query(
        "INSERT INTO categories (slug, title, description, is_published) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.is_published)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    let id = result.last_insert_id() as i64;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after insert"))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        "SELECT id, slug, title, description, is_published, created_at FROM categories ORDER BY title ASC",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_mysql).collect())
}

async fn set_published_mysql(pool: &MySqlPool, id: i64, is_published: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE categories SET is_published = ? WHERE id = ?")
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update category publication")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    // Detach referencing posts first; the FK has no ON DELETE action.
    sqlx::query("UPDATE posts SET category_id = NULL WHERE category_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to detach posts from category")?;

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check category slug")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxCategoryRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxCategoryRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let (_pool, repo) = setup_test_repo().await;

        let input = CreateCategoryInput::new(
            "travel".to_string(),
            "Travel".to_string(),
            "Trips".to_string(),
        );
        let created = repo.create(&input).await.expect("create failed");
        assert!(created.id > 0);
        assert!(created.is_published);

        let found = repo
            .get_by_slug("travel")
            .await
            .expect("query failed")
            .expect("category not found");
        assert_eq!(found.id, created.id);

        assert!(repo
            .get_by_slug("missing")
            .await
            .expect("query failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_exists_by_slug() {
        let (_pool, repo) = setup_test_repo().await;

        let input = CreateCategoryInput::new(
            "travel".to_string(),
            "Travel".to_string(),
            "Trips".to_string(),
        );
        repo.create(&input).await.expect("create failed");

        assert!(repo.exists_by_slug("travel").await.expect("query failed"));
        assert!(!repo.exists_by_slug("food").await.expect("query failed"));
    }

    #[tokio::test]
    async fn test_set_published() {
        let (_pool, repo) = setup_test_repo().await;

        let input = CreateCategoryInput::new(
            "travel".to_string(),
            "Travel".to_string(),
            "Trips".to_string(),
        );
        let created = repo.create(&input).await.expect("create failed");

        assert!(repo
            .set_published(created.id, false)
            .await
            .expect("update failed"));
        let found = repo
            .get_by_id(created.id)
            .await
            .expect("query failed")
            .expect("category not found");
        assert!(!found.is_published);

        assert!(!repo.set_published(999, false).await.expect("update failed"));
    }

    #[tokio::test]
    async fn test_delete_detaches_posts() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite_pool = pool.as_sqlite().unwrap();

        let input = CreateCategoryInput::new(
            "travel".to_string(),
            "Travel".to_string(),
            "Trips".to_string(),
        );
        let created = repo.create(&input).await.expect("create failed");

        sqlx::query("INSERT INTO authors (username) VALUES ('alice')")
            .execute(sqlite_pool)
            .await
            .expect("author insert failed");
        sqlx::query(
            "INSERT INTO posts (author_id, title, text, pub_date, category_id) VALUES (1, 'T', 'x', CURRENT_TIMESTAMP, ?)",
        )
        .bind(created.id)
        .execute(sqlite_pool)
        .await
        .expect("post insert failed");

        assert!(repo.delete(created.id).await.expect("delete failed"));

        let row = sqlx::query("SELECT category_id FROM posts WHERE id = 1")
            .fetch_one(sqlite_pool)
            .await
            .expect("query failed");
        let category_id: Option<i64> = row.get("category_id");
        assert!(category_id.is_none());
    }
}
