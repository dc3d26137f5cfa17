// Post publishing service.
//
// Authors (and the admin) create posts and flip them between draft and
// published. Publishing stamps `published_at` and tells subscribers.

use super::post_models::{NewPost, Post, PostDraft};
use crate::core::notifications::Notifier;
use crate::core::tags::Tag;
use crate::core::text::slugify;
use crate::core::users::{AccessPolicy, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Post not found: {0}")]
    NotFound(i64),

    #[error("Not authorized: {0}")]
    Unauthorized(String),
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, draft: PostDraft) -> Result<Post, PostError>;

    async fn get_post(&self, post_id: i64) -> Result<Option<Post>, PostError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, PostError>;

    /// Set the published flag and timestamp together.
    async fn set_published(
        &self,
        post_id: i64,
        published: bool,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Post, PostError>;

    /// Link a tag to a post. Returns `false` if they were already linked.
    async fn attach_tag(&self, post_id: i64, tag_id: i64) -> Result<bool, PostError>;

    /// Tags on a post, in the order they were attached.
    async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>, PostError>;

    /// Published posts carrying the tag with this slug, newest first.
    async fn list_published_by_tag(&self, tag_slug: &str) -> Result<Vec<Post>, PostError>;
}

pub struct PostPublisherService<S: PostStore, N: Notifier> {
    store: S,
    notifier: N,
    access: AccessPolicy,
}

impl<S: PostStore, N: Notifier> PostPublisherService<S, N> {
    pub fn new(store: S, notifier: N, access: AccessPolicy) -> Self {
        Self {
            store,
            notifier,
            access,
        }
    }

    /// Create a draft post owned by `author`.
    pub async fn create_post(&self, author: &User, post: NewPost) -> Result<Post, PostError> {
        post.validate()?;

        let slug = self.unique_slug(&post.title).await?;
        let draft = PostDraft {
            user_id: author.id,
            title: post.title.trim().to_string(),
            slug,
            excerpt: post.excerpt(),
            content: post.content,
        };

        self.store.create_post(draft).await
    }

    /// Publish a draft, or unpublish a published post.
    ///
    /// Every publish notifies subscribers; there is no per-author opt-out.
    pub async fn toggle_publication(&self, actor: &User, post_id: i64) -> Result<Post, PostError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))?;

        if !self.can_publish(actor, &post) {
            return Err(PostError::Unauthorized(
                "Only the author can publish this post".to_string(),
            ));
        }

        if post.published {
            let post = self.store.set_published(post_id, false, None).await?;
            tracing::info!(post_id, "Post unpublished");
            Ok(post)
        } else {
            let post = self
                .store
                .set_published(post_id, true, Some(Utc::now()))
                .await?;
            tracing::info!(post_id, slug = %post.slug, "Post published");
            self.notifier.notify_subscribers(&post);
            Ok(post)
        }
    }

    /// Tag a post. Only its author (or the admin) may do this.
    pub async fn tag_post(&self, actor: &User, post_id: i64, tag_id: i64) -> Result<bool, PostError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))?;

        if !self.can_publish(actor, &post) {
            return Err(PostError::Unauthorized(
                "Only the author can tag this post".to_string(),
            ));
        }

        self.store.attach_tag(post_id, tag_id).await
    }

    pub async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>, PostError> {
        self.store.tags_for_post(post_id).await
    }

    pub async fn published_posts_by_tag(&self, tag_slug: &str) -> Result<Vec<Post>, PostError> {
        self.store.list_published_by_tag(tag_slug.trim()).await
    }

    fn can_publish(&self, user: &User, post: &Post) -> bool {
        user.id == post.user_id || self.access.is_admin(user)
    }

    /// Slug from the title, suffixed with `-2`, `-3`, ... until it's free.
    async fn unique_slug(&self, title: &str) -> Result<String, PostError> {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut suffix = 2;

        while self.store.slug_exists(&candidate).await? {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }

        Ok(candidate)
    }
}
