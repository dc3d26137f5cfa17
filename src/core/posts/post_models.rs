// Post domain models.

use super::publisher_service::PostError;
use crate::core::tags::Tag;
use crate::core::text::{is_blank, slugify, truncate_chars};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_TITLE_CHARS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 255;
pub const EXCERPT_CHARS: usize = 300;
const WORDS_PER_MINUTE: usize = 200;
const FALLBACK_TAG: &str = "Blog";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    /// Author of the post
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_draft(&self) -> bool {
        !self.published
    }

    /// Minutes to read at 200 words per minute, rounded up.
    pub fn reading_time(&self) -> usize {
        let words = self.content.split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE)
    }

    /// The first `word_limit` words, with `...` if anything was cut.
    pub fn content_preview(&self, word_limit: usize) -> String {
        let words: Vec<&str> = self.content.split_whitespace().collect();
        if words.len() > word_limit {
            format!("{}...", words[..word_limit].join(" "))
        } else {
            self.content.clone()
        }
    }
}

/// Name of the first tag, for the label shown on post cards.
pub fn primary_tag(tags: &[Tag]) -> &str {
    tags.first().map_or(FALLBACK_TAG, |t| t.name.as_str())
}

/// Input for creating a post. Slug and excerpt are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), PostError> {
        let title_chars = self.title.trim().chars().count();
        if title_chars < MIN_TITLE_CHARS {
            return Err(PostError::ValidationError(format!(
                "Title is too short (minimum is {MIN_TITLE_CHARS} characters)"
            )));
        }
        if title_chars > MAX_TITLE_CHARS {
            return Err(PostError::ValidationError(format!(
                "Title is too long (maximum is {MAX_TITLE_CHARS} characters)"
            )));
        }
        if is_blank(&self.content) {
            return Err(PostError::ValidationError(
                "Content can't be blank".to_string(),
            ));
        }
        if slugify(&self.title).is_empty() {
            return Err(PostError::ValidationError(
                "Title needs at least one letter or digit".to_string(),
            ));
        }
        Ok(())
    }

    pub fn excerpt(&self) -> String {
        truncate_chars(self.content.trim(), EXCERPT_CHARS)
    }
}

/// Everything the store needs to insert a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
}
