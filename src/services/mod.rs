//! Services layer - Business logic
//!
//! The visibility filter and authorization guard, plus the mutation
//! services that call the guard before touching storage.

pub mod authorization;
pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod visibility;

pub use authorization::{
    can_mutate, ensure_comment_in_post, require_mutate, require_superuser, AccessError,
};
pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use location::{LocationService, LocationServiceError};
pub use post::{PostService, PostServiceError};
pub use visibility::{filter_visible, VisibilityFilter, VisibilityError};
