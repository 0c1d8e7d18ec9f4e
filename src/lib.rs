//! Chronica - post visibility and authorization core for a blog platform
//!
//! This library decides which posts a viewer may see and who may mutate
//! which resource. Transport, sessions and rendering are the calling
//! application's concern.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
