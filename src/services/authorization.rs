//! Authorization guard
//!
//! Stateless predicates deciding who may mutate which resource. Every
//! mutation entry point calls these explicitly; there is no shared
//! dispatch layer and no caching across calls, so a role change takes
//! effect on the next request.

use crate::models::{Comment, Viewer};

/// Error types for access decisions
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Viewer is anonymous, or authenticated but not entitled
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not belong to the path context it was requested
    /// under. The boundary treats this like a missing resource; it is
    /// never silently ignored.
    #[error("Inconsistent request: {0}")]
    Inconsistent(String),
}

/// Check whether `viewer` may mutate content owned by `author_id`.
///
/// True iff the viewer is authenticated and is the owner or a
/// superuser. Anonymous viewers can never mutate.
pub fn can_mutate(viewer: Option<&Viewer>, author_id: i64) -> bool {
    viewer.map_or(false, |v| v.can_mutate(author_id))
}

/// Require mutation rights, failing with `Forbidden` otherwise.
pub fn require_mutate(viewer: Option<&Viewer>, author_id: i64) -> Result<(), AccessError> {
    if can_mutate(viewer, author_id) {
        return Ok(());
    }
    Err(match viewer {
        Some(v) => AccessError::Forbidden(format!(
            "viewer {} may not modify content owned by author {}",
            v.id, author_id
        )),
        None => AccessError::Forbidden("authentication required".to_string()),
    })
}

/// Require superuser rights, failing with `Forbidden` otherwise.
pub fn require_superuser(viewer: Option<&Viewer>) -> Result<(), AccessError> {
    match viewer {
        Some(v) if v.is_superuser => Ok(()),
        Some(v) => Err(AccessError::Forbidden(format!(
            "viewer {} is not a superuser",
            v.id
        ))),
        None => Err(AccessError::Forbidden("authentication required".to_string())),
    }
}

/// Check that a comment belongs to the post named by the request path.
pub fn ensure_comment_in_post(comment: &Comment, post_id: i64) -> Result<(), AccessError> {
    if comment.post_id == post_id {
        Ok(())
    } else {
        Err(AccessError::Inconsistent(format!(
            "comment {} belongs to post {}, not post {}",
            comment.id, comment.post_id, post_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: i64, post_id: i64, author_id: i64) -> Comment {
        Comment {
            id,
            post_id,
            author_id,
            text: "text".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_cannot_mutate() {
        assert!(!can_mutate(None, 1));
        assert!(matches!(
            require_mutate(None, 1),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn test_owner_can_mutate() {
        let viewer = Viewer::new(1);
        assert!(can_mutate(Some(&viewer), 1));
        assert!(require_mutate(Some(&viewer), 1).is_ok());
    }

    #[test]
    fn test_non_owner_cannot_mutate() {
        let viewer = Viewer::new(1);
        assert!(!can_mutate(Some(&viewer), 2));
        assert!(matches!(
            require_mutate(Some(&viewer), 2),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn test_superuser_can_mutate_any() {
        let root = Viewer::superuser(99);
        assert!(can_mutate(Some(&root), 1));
        assert!(require_mutate(Some(&root), 1).is_ok());
    }

    #[test]
    fn test_require_superuser() {
        assert!(require_superuser(Some(&Viewer::superuser(1))).is_ok());
        assert!(matches!(
            require_superuser(Some(&Viewer::new(1))),
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(
            require_superuser(None),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn test_comment_in_matching_post() {
        let c = comment(1, 10, 1);
        assert!(ensure_comment_in_post(&c, 10).is_ok());
    }

    #[test]
    fn test_comment_in_mismatched_post() {
        let c = comment(1, 10, 1);
        assert!(matches!(
            ensure_comment_in_post(&c, 11),
            Err(AccessError::Inconsistent(_))
        ));
    }
}
