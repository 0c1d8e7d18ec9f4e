//! Author model
//!
//! The external identity system owns user accounts; this crate stores
//! only the directory record that `author_id` references point at and
//! that profile (by-author) listings are resolved against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author directory record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    /// Unique identifier, matching the identity collaborator's user ID
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
