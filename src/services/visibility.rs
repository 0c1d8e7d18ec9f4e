//! Post visibility
//!
//! Decides which posts a viewer is entitled to see. The repository
//! narrows candidates to a scope; the rules live here:
//!
//! - a live post (published, not future-dated, category published) is
//!   visible to everyone;
//! - an author additionally sees their own posts on the front page,
//!   their profile and detail pages, but never on category listings;
//! - an unpublished category has no listing page for any viewer.
//!
//! All operations are read-only and evaluated against the snapshot the
//! storage layer supplies for the current request.

use crate::db::repositories::{
    AuthorRepository, CategoryRepository, CommentRepository, PostRepository,
};
use crate::models::{FilterSpec, Post, PostWithComments, Viewer};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Error types for visibility queries
#[derive(Debug, thiserror::Error)]
pub enum VisibilityError {
    /// Requested resource or its enclosing scope does not exist or is
    /// not visible
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Apply the visibility rules to a candidate set and fix the order.
///
/// A post is kept when it is live at `now`, or when the viewer is its
/// author and the scope is not a category listing. The result is
/// ordered newest first, ties broken by descending id, so repeated
/// fetches slice identically for unchanged data.
pub fn filter_visible(
    posts: Vec<Post>,
    viewer: Option<&Viewer>,
    spec: &FilterSpec,
    now: DateTime<Utc>,
) -> Vec<Post> {
    let mut visible: Vec<Post> = posts
        .into_iter()
        .filter(|post| {
            post.is_live(now)
                || (!spec.is_category() && viewer.map_or(false, |v| v.id == post.author_id))
        })
        .collect();

    visible.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
    visible
}

/// Visibility queries over the post collection
pub struct VisibilityFilter {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    comments: Arc<dyn CommentRepository>,
    authors: Arc<dyn AuthorRepository>,
}

impl VisibilityFilter {
    /// Create a new visibility filter over the given repositories
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        comments: Arc<dyn CommentRepository>,
        authors: Arc<dyn AuthorRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            comments,
            authors,
        }
    }

    /// List the posts `viewer` may see within `spec`, newest first,
    /// each annotated with its comment count.
    ///
    /// # Errors
    /// - `NotFound` for a category scope whose slug is unknown or whose
    ///   category is unpublished
    /// - `NotFound` for an author scope naming an unknown author
    pub async fn visible_posts(
        &self,
        viewer: Option<&Viewer>,
        spec: &FilterSpec,
    ) -> Result<Vec<PostWithComments>, VisibilityError> {
        match spec {
            FilterSpec::ByCategory(slug) => {
                let category = self
                    .categories
                    .get_by_slug(slug)
                    .await
                    .context("Failed to resolve category scope")?;
                match category {
                    Some(c) if c.is_published => {}
                    _ => {
                        return Err(VisibilityError::NotFound(format!(
                            "Category not found: {}",
                            slug
                        )))
                    }
                }
            }
            FilterSpec::ByAuthor(author_id) => {
                let exists = self
                    .authors
                    .exists(*author_id)
                    .await
                    .context("Failed to resolve author scope")?;
                if !exists {
                    return Err(VisibilityError::NotFound(format!(
                        "Author not found: {}",
                        author_id
                    )));
                }
            }
            FilterSpec::All => {}
        }

        let candidates = self
            .posts
            .fetch_posts(spec)
            .await
            .context("Failed to fetch posts")?;
        let visible = filter_visible(candidates, viewer, spec, Utc::now());

        let ids: Vec<i64> = visible.iter().map(|p| p.id).collect();
        let counts = self
            .comments
            .count_for_posts(&ids)
            .await
            .context("Failed to count comments")?;

        Ok(visible
            .into_iter()
            .map(|post| {
                let comment_count = counts.get(&post.id).copied().unwrap_or(0);
                PostWithComments {
                    post,
                    comment_count,
                }
            })
            .collect())
    }

    /// Fetch a single post for its detail page.
    ///
    /// Live posts are visible to everyone; an author always sees their
    /// own post. Anything else is `NotFound`.
    pub async fn visible_post(
        &self,
        viewer: Option<&Viewer>,
        post_id: i64,
    ) -> Result<Post, VisibilityError> {
        let post = self
            .posts
            .get_by_id(post_id)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| VisibilityError::NotFound(format!("Post not found: {}", post_id)))?;

        let own = viewer.map_or(false, |v| v.id == post.author_id);
        if post.is_live(Utc::now()) || own {
            Ok(post)
        } else {
            Err(VisibilityError::NotFound(format!(
                "Post not found: {}",
                post_id
            )))
        }
    }
}
