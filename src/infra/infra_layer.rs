// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

pub mod database;

#[path = "bookmarks/sqlite_bookmark_store.rs"]
pub mod bookmarks;

#[path = "comments/sqlite_comment_store.rs"]
pub mod comments;

#[path = "posts/sqlite_post_store.rs"]
pub mod posts;

#[path = "tags/sqlite_tag_store.rs"]
pub mod tags;

#[path = "notifications/tracing_notifier.rs"]
pub mod notifications;
