//! Category service
//!
//! Reference-data management. Categories are curated by superusers;
//! regular authors only attach them to posts.

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, Viewer};
use crate::services::authorization::{require_superuser, AccessError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Access decision failed
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate slug
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category.
    ///
    /// # Errors
    /// - `Access` unless the viewer is a superuser
    /// - `Validation` for a blank title or malformed slug
    /// - `DuplicateSlug` if the slug is taken
    pub async fn create(
        &self,
        viewer: Option<&Viewer>,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        require_superuser(viewer)?;

        if input.title.trim().is_empty() {
            return Err(CategoryServiceError::Validation(
                "Category title cannot be empty".to_string(),
            ));
        }
        validate_slug(&input.slug)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateSlug(input.slug));
        }

        let category = self
            .repo
            .create(&input)
            .await
            .context("Failed to create category")?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Get a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to fetch category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("Category not found: {}", slug)))
    }

    /// List all categories.
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = self.repo.list().await.context("Failed to list categories")?;
        Ok(categories)
    }

    /// Publish or unpublish a category.
    ///
    /// Unpublishing takes the category's listing page and all its
    /// posts' public visibility with it.
    pub async fn set_published(
        &self,
        viewer: Option<&Viewer>,
        id: i64,
        is_published: bool,
    ) -> Result<(), CategoryServiceError> {
        require_superuser(viewer)?;

        let updated = self
            .repo
            .set_published(id, is_published)
            .await
            .context("Failed to update category publication")?;
        if !updated {
            return Err(CategoryServiceError::NotFound(format!(
                "Category not found: {}",
                id
            )));
        }
        Ok(())
    }

    /// Delete a category. Referencing posts survive without a category.
    pub async fn delete(
        &self,
        viewer: Option<&Viewer>,
        id: i64,
    ) -> Result<(), CategoryServiceError> {
        require_superuser(viewer)?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete category")?;
        if !deleted {
            return Err(CategoryServiceError::NotFound(format!(
                "Category not found: {}",
                id
            )));
        }

        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

/// Slugs are lowercase ASCII letters, digits, hyphen and underscore.
fn validate_slug(slug: &str) -> Result<(), CategoryServiceError> {
    if slug.is_empty() {
        return Err(CategoryServiceError::Validation(
            "Category slug cannot be empty".to_string(),
        ));
    }
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(CategoryServiceError::Validation(format!(
            "Invalid category slug: {}",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    fn input(slug: &str) -> CreateCategoryInput {
        CreateCategoryInput::new(slug.to_string(), "Title".to_string(), "desc".to_string())
    }

    #[tokio::test]
    async fn test_regular_viewer_cannot_create() {
        let service = setup_test_service().await;
        let viewer = Viewer::new(1);

        let result = service.create(Some(&viewer), input("news")).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::Access(AccessError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_superuser_creates_category() {
        let service = setup_test_service().await;
        let root = Viewer::superuser(1);

        let category = service
            .create(Some(&root), input("news"))
            .await
            .expect("create failed");
        assert_eq!(category.slug, "news");

        let found = service.get_by_slug("news").await.expect("get failed");
        assert_eq!(found.id, category.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let service = setup_test_service().await;
        let root = Viewer::superuser(1);

        service
            .create(Some(&root), input("news"))
            .await
            .expect("create failed");
        let result = service.create(Some(&root), input("news")).await;
        assert!(matches!(result, Err(CategoryServiceError::DuplicateSlug(_))));
    }

    #[tokio::test]
    async fn test_malformed_slug_is_rejected() {
        let service = setup_test_service().await;
        let root = Viewer::superuser(1);

        for slug in ["", "With Space", "ÆØÅ", "UPPER"] {
            let result = service.create(Some(&root), input(slug)).await;
            assert!(
                matches!(result, Err(CategoryServiceError::Validation(_))),
                "slug {:?} should be rejected",
                slug
            );
        }
    }

    #[tokio::test]
    async fn test_set_published_unknown_id_is_not_found() {
        let service = setup_test_service().await;
        let root = Viewer::superuser(1);

        let result = service.set_published(Some(&root), 4242, false).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup_test_service().await;
        let root = Viewer::superuser(1);

        let category = service
            .create(Some(&root), input("news"))
            .await
            .expect("create failed");
        service
            .delete(Some(&root), category.id)
            .await
            .expect("delete failed");

        let result = service.get_by_slug("news").await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound(_))));
    }
}
