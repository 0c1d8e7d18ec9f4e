//! Category model
//!
//! Categories are shared, read-mostly reference data. Posts reference
//! them through a nullable relation; deleting a category detaches the
//! posts that pointed at it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Category title
    pub title: String,
    /// Category description
    pub description: String,
    /// Publication flag; an unpublished category has no listing page
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(slug: String, title: String, description: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            slug,
            title,
            description,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    /// URL-friendly slug
    pub slug: String,
    /// Category title
    pub title: String,
    /// Category description
    pub description: String,
    /// Publication flag (defaults to published)
    pub is_published: bool,
}

impl CreateCategoryInput {
    pub fn new(slug: String, title: String, description: String) -> Self {
        Self {
            slug,
            title,
            description,
            is_published: true,
        }
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new(
            "travel".to_string(),
            "Travel".to_string(),
            "Trips and places".to_string(),
        );

        assert_eq!(category.id, 0);
        assert_eq!(category.slug, "travel");
        assert_eq!(category.title, "Travel");
        assert!(category.is_published);
    }
}
