//! Viewer identity
//!
//! The identity collaborator resolves the session to a `Viewer` once
//! per request; anonymous viewers are `None` at the call sites. The
//! core keeps no identity state of its own, so a changed role takes
//! effect on the next request.

use serde::{Deserialize, Serialize};

/// Resolved identity of the current viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// User ID
    pub id: i64,
    /// Superuser flag reported by the identity collaborator
    pub is_superuser: bool,
}

impl Viewer {
    /// Create a regular viewer
    pub fn new(id: i64) -> Self {
        Self {
            id,
            is_superuser: false,
        }
    }

    /// Create a superuser viewer
    pub fn superuser(id: i64) -> Self {
        Self {
            id,
            is_superuser: true,
        }
    }

    /// Check if this viewer may mutate content owned by `author_id`.
    ///
    /// Superusers may mutate any content; everyone else only their own.
    pub fn can_mutate(&self, author_id: i64) -> bool {
        self.is_superuser || self.id == author_id
    }
}
