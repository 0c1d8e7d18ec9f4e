//! Location model
//!
//! Same reference-data semantics as categories: nullable relation from
//! posts, detach on delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Unique identifier
    pub id: i64,
    /// Location name
    pub name: String,
    /// Publication flag
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationInput {
    /// Location name
    pub name: String,
    /// Publication flag (defaults to published)
    pub is_published: bool,
}

impl CreateLocationInput {
    pub fn new(name: String) -> Self {
        Self {
            name,
            is_published: true,
        }
    }
}
