//! Location service
//!
//! Curated reference data, same shape as categories but without slugs
//! or listing pages.

use crate::db::repositories::LocationRepository;
use crate::models::{CreateLocationInput, Location, Viewer};
use crate::services::authorization::{require_superuser, AccessError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for location service operations
#[derive(Debug, thiserror::Error)]
pub enum LocationServiceError {
    /// Location not found
    #[error("Location not found: {0}")]
    NotFound(i64),

    /// Access decision failed
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Location service
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    /// Create a new location service
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    /// Create a location.
    pub async fn create(
        &self,
        viewer: Option<&Viewer>,
        input: CreateLocationInput,
    ) -> Result<Location, LocationServiceError> {
        require_superuser(viewer)?;

        if input.name.trim().is_empty() {
            return Err(LocationServiceError::Validation(
                "Location name cannot be empty".to_string(),
            ));
        }

        let location = self
            .repo
            .create(&input)
            .await
            .context("Failed to create location")?;
        Ok(location)
    }

    /// List all locations.
    pub async fn list(&self) -> Result<Vec<Location>, LocationServiceError> {
        let locations = self.repo.list().await.context("Failed to list locations")?;
        Ok(locations)
    }

    /// Publish or unpublish a location.
    pub async fn set_published(
        &self,
        viewer: Option<&Viewer>,
        id: i64,
        is_published: bool,
    ) -> Result<(), LocationServiceError> {
        require_superuser(viewer)?;

        let updated = self
            .repo
            .set_published(id, is_published)
            .await
            .context("Failed to update location publication")?;
        if !updated {
            return Err(LocationServiceError::NotFound(id));
        }
        Ok(())
    }

    /// Delete a location. Referencing posts survive without a location.
    pub async fn delete(
        &self,
        viewer: Option<&Viewer>,
        id: i64,
    ) -> Result<(), LocationServiceError> {
        require_superuser(viewer)?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete location")?;
        if !deleted {
            return Err(LocationServiceError::NotFound(id));
        }

        tracing::info!(location_id = id, "Location deleted");
        Ok(())
    }
}
