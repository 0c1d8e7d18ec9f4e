//! Comment service
//!
//! Comments are addressed as `post -> comment`; a comment fetched under
//! the wrong post is an inconsistent request, not a silent fallback.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CreateCommentInput, Viewer};
use crate::services::authorization::{ensure_comment_in_post, require_mutate, AccessError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment or its enclosing post not found
    #[error("Not found: {0}")]
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

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Add a comment to a post.
    ///
    /// # Errors
    /// - `Access` if the viewer is anonymous
    /// - `NotFound` if the post does not exist
    /// - `Validation` if the text is blank
    pub async fn create(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let viewer = viewer
            .ok_or_else(|| AccessError::Forbidden("authentication required".to_string()))?;

        validate_text(&input.text)?;

        self.posts
            .get_by_id(post_id)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("Post not found: {}", post_id)))?;

        let comment = self
            .comments
            .create(post_id, viewer.id, &input)
            .await
            .context("Failed to create comment")?;

        tracing::debug!(comment_id = comment.id, post_id, "Comment created");
        Ok(comment)
    }

    /// Edit a comment's text.
    ///
    /// # Errors
    /// - `NotFound` if the comment does not exist
    /// - `Access::Inconsistent` if the comment belongs to another post
    /// - `Access::Forbidden` unless the viewer is the comment's author
    ///   or a superuser
    /// - `Validation` if the text is blank
    pub async fn update(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
        comment_id: i64,
        text: String,
    ) -> Result<Comment, CommentServiceError> {
        let existing = self.get_in_post(post_id, comment_id).await?;
        require_mutate(viewer, existing.author_id)?;
        validate_text(&text)?;

        let comment = self
            .comments
            .update_text(comment_id, &text)
            .await
            .context("Failed to update comment")?;

        Ok(comment)
    }

    /// Delete a comment.
    ///
    /// Same guards as [`CommentService::update`].
    pub async fn delete(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), CommentServiceError> {
        let existing = self.get_in_post(post_id, comment_id).await?;
        require_mutate(viewer, existing.author_id)?;

        self.comments
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;

        tracing::debug!(comment_id, post_id, "Comment deleted");
        Ok(())
    }

    /// List a post's comments, oldest first (detail page ordering).
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        let comments = self
            .comments
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?;
        Ok(comments)
    }

    /// Resolve a comment within its request-path post.
    async fn get_in_post(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await
            .context("Failed to fetch comment")?
            .ok_or_else(|| {
                CommentServiceError::NotFound(format!("Comment not found: {}", comment_id))
            })?;

        ensure_comment_in_post(&comment, post_id)?;
        Ok(comment)
    }
}

fn validate_text(text: &str) -> Result<(), CommentServiceError> {
    if text.trim().is_empty() {
        return Err(CommentServiceError::Validation(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCommentRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::CreatePostInput;
    use chrono::{Duration, Utc};

    async fn setup_test_service() -> (DynDatabasePool, CommentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
        );
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

    async fn create_test_post(pool: &DynDatabasePool, author_id: i64, title: &str) -> i64 {
        let input = CreatePostInput::new(
            title.to_string(),
            "text".to_string(),
            Utc::now() - Duration::hours(1),
        );
        SqlxPostRepository::new(pool.clone())
            .create(&input, author_id)
            .await
            .expect("Failed to create post")
            .id
    }

    #[tokio::test]
    async fn test_anonymous_cannot_comment() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;

        let result = service
            .create(None, post_id, CreateCommentInput::new("hi".to_string()))
            .await;
        assert!(matches!(
            result,
            Err(CommentServiceError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_not_found() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let viewer = Viewer::new(author);

        let result = service
            .create(Some(&viewer), 4242, CreateCommentInput::new("hi".to_string()))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let viewer = Viewer::new(author);

        let result = service
            .create(Some(&viewer), post_id, CreateCommentInput::new("  ".to_string()))
            .await;
        assert!(matches!(result, Err(CommentServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let viewer = Viewer::new(author);

        service
            .create(Some(&viewer), post_id, CreateCommentInput::new("first".to_string()))
            .await
            .expect("create failed");
        service
            .create(Some(&viewer), post_id, CreateCommentInput::new("second".to_string()))
            .await
            .expect("create failed");

        let comments = service.list_for_post(post_id).await.expect("list failed");
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_update_under_wrong_post_is_inconsistent() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let p1 = create_test_post(&pool, author, "P1").await;
        let p2 = create_test_post(&pool, author, "P2").await;
        let viewer = Viewer::new(author);

        let comment = service
            .create(Some(&viewer), p1, CreateCommentInput::new("on p1".to_string()))
            .await
            .expect("create failed");

        let result = service
            .update(Some(&viewer), p2, comment.id, "moved?".to_string())
            .await;
        assert!(matches!(
            result,
            Err(CommentServiceError::Access(AccessError::Inconsistent(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_by_other_viewer_is_forbidden() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let owner = Viewer::new(author);
        let intruder = Viewer::new(author + 1);

        let comment = service
            .create(Some(&owner), post_id, CreateCommentInput::new("mine".to_string()))
            .await
            .expect("create failed");

        let result = service
            .update(Some(&intruder), post_id, comment.id, "stolen".to_string())
            .await;
        assert!(matches!(
            result,
            Err(CommentServiceError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_superuser_can_delete_any_comment() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let owner = Viewer::new(author);
        let root = Viewer::superuser(author + 1);

        let comment = service
            .create(Some(&owner), post_id, CreateCommentInput::new("spam".to_string()))
            .await
            .expect("create failed");

        service
            .delete(Some(&root), post_id, comment.id)
            .await
            .expect("superuser delete failed");

        let comments = service.list_for_post(post_id).await.expect("list failed");
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_comment_is_not_found() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let viewer = Viewer::new(author);

        let result = service.delete(Some(&viewer), post_id, 4242).await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_can_edit_own_comment() {
        let (pool, service) = setup_test_service().await;
        let author = create_test_author(&pool, "alice").await;
        let post_id = create_test_post(&pool, author, "Post").await;
        let viewer = Viewer::new(author);

        let comment = service
            .create(Some(&viewer), post_id, CreateCommentInput::new("typo".to_string()))
            .await
            .expect("create failed");

        let updated = service
            .update(Some(&viewer), post_id, comment.id, "fixed".to_string())
            .await
            .expect("update failed");
        assert_eq!(updated.text, "fixed");
    }
}
