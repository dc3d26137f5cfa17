// Core bookmarks module - the public directory of saved websites.

pub mod bookmark_models;
pub mod bookmark_service;

pub use bookmark_models::*;
pub use bookmark_service::*;
