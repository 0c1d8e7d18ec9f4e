//! Data models
//!
//! Database entities (Post, Category, Location, Comment, Author), the
//! resolved `Viewer` identity, and the `FilterSpec` scope description
//! the services hand to storage.

mod author;
mod category;
mod comment;
mod location;
mod post;
mod viewer;

pub use author::Author;
pub use category::{Category, CreateCategoryInput};
pub use comment::{Comment, CreateCommentInput};
pub use location::{CreateLocationInput, Location};
pub use post::{
    CategoryRef, CreatePostInput, FilterSpec, LocationRef, Post, PostWithComments,
    UpdatePostInput,
};
pub use viewer::Viewer;
