//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `CategoryRef` / `LocationRef` join summaries attached by storage
//! - `FilterSpec` describing the query scope handed to storage
//! - Input types for creating and updating posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
///
/// The `category` and `location` fields carry the join summaries the
/// repository resolves alongside the post, so visibility decisions can
/// be made on the value without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Publication timestamp; future dates schedule the post
    pub pub_date: DateTime<Utc>,
    /// Attached image path
    #[serde(default)]
    pub image: Option<String>,
    /// Publication flag
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Category summary, if the post has a category
    pub category: Option<CategoryRef>,
    /// Location summary, if the post has a location
    pub location: Option<LocationRef>,
}

impl Post {
    /// Check whether the post is live at `now`.
    ///
    /// A post is live when it is published, its publication time is not
    /// in the future, and its category (if any) is itself published.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.pub_date <= now
            && self.category.as_ref().map_or(true, |c| c.is_published)
    }
}

/// Category summary embedded in a post row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category ID
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Category title
    pub title: String,
    /// Publication flag
    pub is_published: bool,
}

/// Location summary embedded in a post row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Location ID
    pub id: i64,
    /// Location name
    pub name: String,
    /// Publication flag
    pub is_published: bool,
}

/// Query scope handed to the post repository.
///
/// The services describe *which* posts they want; the repository is
/// responsible for turning that into SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterSpec {
    /// All posts
    All,
    /// Posts by a single author
    ByAuthor(i64),
    /// Posts in the category with the given slug
    ByCategory(String),
}

impl FilterSpec {
    /// Check whether this scope is a category listing
    pub fn is_category(&self) -> bool {
        matches!(self, FilterSpec::ByCategory(_))
    }
}

/// A post annotated with its comment count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    /// Number of comments on the post, visibility-blind
    pub comment_count: i64,
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Publication timestamp
    pub pub_date: DateTime<Utc>,
    /// Category ID (optional)
    pub category_id: Option<i64>,
    /// Location ID (optional)
    pub location_id: Option<i64>,
    /// Attached image path (optional)
    pub image: Option<String>,
    /// Publication flag (defaults to published)
    pub is_published: bool,
}

impl CreatePostInput {
    /// Create a new published post input with the required fields
    pub fn new(title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            title,
            text,
            pub_date,
            category_id: None,
            location_id: None,
            image: None,
            is_published: true,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the location
    pub fn with_location(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// Set the image path
    pub fn with_image(mut self, image: String) -> Self {
        self.image = Some(image);
        self
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}

/// Input for updating an existing post
///
/// Unset fields are left untouched. `category_id`/`location_id`/`image`
/// use a double `Option` so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New body text (optional)
    pub text: Option<String>,
    /// New publication timestamp (optional)
    pub pub_date: Option<DateTime<Utc>>,
    /// New category (optional; `Some(None)` detaches)
    pub category_id: Option<Option<i64>>,
    /// New location (optional; `Some(None)` detaches)
    pub location_id: Option<Option<i64>>,
    /// New image path (optional; `Some(None)` removes)
    pub image: Option<Option<String>>,
    /// New publication flag (optional)
    pub is_published: Option<bool>,
}

impl UpdatePostInput {
    /// Create a new empty UpdatePostInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Set the body text
    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    /// Set the publication timestamp
    pub fn with_pub_date(mut self, pub_date: DateTime<Utc>) -> Self {
        self.pub_date = Some(pub_date);
        self
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.pub_date.is_some()
            || self.category_id.is_some()
            || self.location_id.is_some()
            || self.image.is_some()
            || self.is_published.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(is_published: bool, pub_date: DateTime<Utc>, category: Option<CategoryRef>) -> Post {
        Post {
            id: 1,
            author_id: 1,
            title: "Title".to_string(),
            text: "Text".to_string(),
            pub_date,
            image: None,
            is_published,
            created_at: Utc::now(),
            category,
            location: None,
        }
    }

    fn category(is_published: bool) -> CategoryRef {
        CategoryRef {
            id: 1,
            slug: "news".to_string(),
            title: "News".to_string(),
            is_published,
        }
    }

    #[test]
    fn test_is_live_published_past() {
        let now = Utc::now();
        let p = post(true, now - Duration::days(1), None);
        assert!(p.is_live(now));
    }

    #[test]
    fn test_is_live_unpublished() {
        let now = Utc::now();
        let p = post(false, now - Duration::days(1), None);
        assert!(!p.is_live(now));
    }

    #[test]
    fn test_is_live_future_dated() {
        let now = Utc::now();
        let p = post(true, now + Duration::days(1), None);
        assert!(!p.is_live(now));
    }

    #[test]
    fn test_is_live_at_exact_pub_date() {
        let now = Utc::now();
        let p = post(true, now, None);
        assert!(p.is_live(now));
    }

    #[test]
    fn test_is_live_unpublished_category() {
        let now = Utc::now();
        let p = post(true, now - Duration::days(1), Some(category(false)));
        assert!(!p.is_live(now));
    }

    #[test]
    fn test_is_live_published_category() {
        let now = Utc::now();
        let p = post(true, now - Duration::days(1), Some(category(true)));
        assert!(p.is_live(now));
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdatePostInput::new().has_changes());
        assert!(UpdatePostInput::new().with_title("New".to_string()).has_changes());
        let detach = UpdatePostInput {
            category_id: Some(None),
            ..Default::default()
        };
        assert!(detach.has_changes());
    }
}
