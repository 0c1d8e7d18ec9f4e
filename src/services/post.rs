//! Post service
//!
//! Mutation entry points for posts. Every mutation checks the
//! authorization guard explicitly before touching storage.

use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, Post, UpdatePostInput, Viewer};
use crate::services::authorization::{require_mutate, AccessError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Access decision failed (forbidden or inconsistent request)
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Post service for managing blog posts
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a new post owned by the viewer.
    ///
    /// The author is always the authenticated viewer; callers cannot
    /// create posts on someone else's behalf.
    ///
    /// # Errors
    /// - `Access` if the viewer is anonymous
    /// - `Validation` if title or text is blank
    pub async fn create(
        &self,
        viewer: Option<&Viewer>,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        let viewer = viewer
            .ok_or_else(|| AccessError::Forbidden("authentication required".to_string()))?;

        validate_title(&input.title)?;
        validate_text(&input.text)?;

        let post = self
            .repo
            .create(&input, viewer.id)
            .await
            .context("Failed to create post")?;

        tracing::info!(post_id = post.id, author_id = viewer.id, "Post created");
        Ok(post)
    }

    /// Get a post by ID, without visibility rules.
    ///
    /// Mutation flows use this to resolve their target; listing and
    /// detail pages go through the visibility filter instead.
    pub async fn get(&self, post_id: i64) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_id(post_id)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post not found: {}", post_id)))
    }

    /// Update a post.
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist
    /// - `Access` unless the viewer is the author or a superuser
    /// - `Validation` if a provided title or text is blank
    pub async fn update(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self.get(post_id).await?;
        require_mutate(viewer, existing.author_id)?;

        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(text) = &input.text {
            validate_text(text)?;
        }

        if !input.has_changes() {
            return Ok(existing);
        }

        let post = self
            .repo
            .update(post_id, &input)
            .await
            .context("Failed to update post")?;

        tracing::debug!(post_id, "Post updated");
        Ok(post)
    }

    /// Delete a post together with its comments.
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist
    /// - `Access` unless the viewer is the author or a superuser
    pub async fn delete(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
    ) -> Result<(), PostServiceError> {
        let existing = self.get(post_id).await?;
        require_mutate(viewer, existing.author_id)?;

        self.repo
            .delete(post_id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(post_id, "Post deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::Validation(
            "Post title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), PostServiceError> {
    if text.trim().is_empty() {
        return Err(PostServiceError::Validation(
            "Post text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CommentRepository, SqlxCommentRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::CreateCommentInput;
    use chrono::{Duration, Utc};

    async fn setup_test_service() -> (DynDatabasePool, PostService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = PostService::new(SqlxPostRepository::boxed(pool.clone()));
        (pool, service)
    }

    async fn create_test_author(pool: &DynDatabasePool, username: &str) -> i64 {
        let result = sqlx::query("INSERT INTO authors (username) VALUES (?)")
            .bind(username)
            .execute(pool.as_sqlite().unwrap())
            .await
            .expect("Failed to create test author");
        result.last_insert_rowid()
    }

    fn test_input(title: &str) -> CreatePostInput {
        CreatePostInput::new(
            title.to_string(),
            "Some text".to_string(),
            Utc::now() - Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create() {
        let (_pool, service) = setup_test_service().await;

        let result = service.create(None, test_input("Hello")).await;
        assert!(matches!(
            result,
            Err(PostServiceError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_sets_author_from_viewer() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let post = service
            .create(Some(&viewer), test_input("Hello"))
            .await
            .expect("create failed");
        assert_eq!(post.author_id, author_id);
    }

    #[tokio::test]
    async fn test_create_blank_title_fails() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let result = service.create(Some(&viewer), test_input("   ")).await;
        assert!(matches!(result, Err(PostServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_blank_text_fails() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let mut input = test_input("Hello");
        input.text = "  \n\t ".to_string();
        let result = service.create(Some(&viewer), input).await;
        assert!(matches!(result, Err(PostServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_author() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let post = service
            .create(Some(&viewer), test_input("Original"))
            .await
            .expect("create failed");

        let updated = service
            .update(
                Some(&viewer),
                post.id,
                UpdatePostInput::new().with_title("Edited".to_string()),
            )
            .await
            .expect("update failed");
        assert_eq!(updated.title, "Edited");
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let owner = Viewer::new(author_id);
        let intruder = Viewer::new(author_id + 1);

        let post = service
            .create(Some(&owner), test_input("Mine"))
            .await
            .expect("create failed");

        let result = service
            .update(
                Some(&intruder),
                post.id,
                UpdatePostInput::new().with_title("Hijacked".to_string()),
            )
            .await;
        assert!(matches!(
            result,
            Err(PostServiceError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_by_superuser() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let owner = Viewer::new(author_id);
        let root = Viewer::superuser(author_id + 1);

        let post = service
            .create(Some(&owner), test_input("Mine"))
            .await
            .expect("create failed");

        let updated = service
            .update(
                Some(&root),
                post.id,
                UpdatePostInput::new().with_published(false),
            )
            .await
            .expect("superuser update failed");
        assert!(!updated.is_published);
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let result = service
            .update(
                Some(&viewer),
                4242,
                UpdatePostInput::new().with_title("X".to_string()),
            )
            .await;
        assert!(matches!(result, Err(PostServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_comments() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author_id);

        let post = service
            .create(Some(&viewer), test_input("Doomed"))
            .await
            .expect("create failed");

        let comments = SqlxCommentRepository::new(pool.clone());
        comments
            .create(post.id, author_id, &CreateCommentInput::new("hi".to_string()))
            .await
            .expect("comment failed");

        service
            .delete(Some(&viewer), post.id)
            .await
            .expect("delete failed");

        let result = service.get(post.id).await;
        assert!(matches!(result, Err(PostServiceError::NotFound(_))));
        assert_eq!(
            comments.count_by_post(post.id).await.expect("count failed"),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let (pool, service) = setup_test_service().await;
        let author_id = create_test_author(&pool, "alice").await;
        let owner = Viewer::new(author_id);
        let intruder = Viewer::new(author_id + 1);

        let post = service
            .create(Some(&owner), test_input("Mine"))
            .await
            .expect("create failed");

        let result = service.delete(Some(&intruder), post.id).await;
        assert!(matches!(
            result,
            Err(PostServiceError::Access(AccessError::Forbidden(_)))
        ));

        // Still there.
        service.get(post.id).await.expect("post should survive");
    }
}
