// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "bookmarks/mod.rs"]
pub mod bookmarks;

#[path = "comments/mod.rs"]
pub mod comments;

#[path = "notifications/notifier.rs"]
pub mod notifications;

#[path = "posts/mod.rs"]
pub mod posts;

#[path = "tags/suggestion_service.rs"]
pub mod tags;

#[path = "users/user_models.rs"]
pub mod users;

pub mod text;
