pub mod post_models;
pub mod publisher_service;

pub use post_models::*;
pub use publisher_service::*;
