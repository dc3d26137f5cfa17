// Comment domain models - data structures for the moderation system.
//
// These are pure domain types with no storage dependencies.
// The infra layer maps them to and from database rows.

use super::moderation_service::CommentError;
use super::spam_heuristics::DEFAULT_SPAM_KEYWORDS;
use crate::core::text::is_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const MIN_BODY_CHARS: usize = 10;
pub const MAX_BODY_CHARS: usize = 1000;

/// Where a comment sits in moderation.
///
/// Stored as lowercase text so that a rejected comment never looks like one
/// still waiting for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = CommentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(CommentError::StorageError(format!(
                "Unknown moderation status: {other}"
            ))),
        }
    }
}

/// Why a comment was rejected. A comment can trip several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    SpamKeywords,
    SuspiciousLinks,
    TooShort,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::SpamKeywords => write!(f, "Contains spam keywords"),
            RejectionReason::SuspiciousLinks => write!(f, "Too many links"),
            RejectionReason::TooShort => write!(f, "Comment is too short"),
        }
    }
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// Author of the comment
    pub user_id: i64,
    pub body: String,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_approved(&self) -> bool {
        self.status == ModerationStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == ModerationStatus::Pending
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ModerationStatus::Rejected
    }
}

/// A comment that hasn't been saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub body: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), CommentError> {
        validate_body(&self.body)
    }
}

/// Body must be present and between 10 and 1000 characters.
pub fn validate_body(body: &str) -> Result<(), CommentError> {
    if is_blank(body) {
        return Err(CommentError::ValidationError(
            "Body can't be blank".to_string(),
        ));
    }

    let chars = body.chars().count();
    if chars < MIN_BODY_CHARS {
        return Err(CommentError::ValidationError(format!(
            "Body is too short (minimum is {MIN_BODY_CHARS} characters)"
        )));
    }
    if chars > MAX_BODY_CHARS {
        return Err(CommentError::ValidationError(format!(
            "Body is too long (maximum is {MAX_BODY_CHARS} characters)"
        )));
    }

    Ok(())
}

/// What moderation decided for a comment, plus the stored result.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationReport {
    pub comment: Comment,
    pub outcome: ModerationStatus,
    /// Empty unless the outcome is `Rejected`
    pub reasons: Vec<RejectionReason>,
}

/// Tally from one pass over the review queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub examined: usize,
    pub approved: usize,
    pub rejected: usize,
    pub still_pending: usize,
    /// Comments whose status write failed; they stay pending for the next pass
    pub failed: usize,
}

/// Tuning knobs for the moderation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Approved comments an author needs before new ones skip the queue
    pub trust_threshold: u64,
    /// More links than this marks a comment as suspicious
    pub max_links: usize,
    /// Bodies shorter than this are rejected outright
    pub min_body_chars: usize,
    /// Case-insensitive substrings that mark a comment as spam
    pub spam_keywords: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            trust_threshold: 3,
            max_links: 2,
            min_body_chars: MIN_BODY_CHARS,
            spam_keywords: DEFAULT_SPAM_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Uniform success/failure envelope handed back to the request layer.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }
}

impl<T: Serialize> ServiceResult<T> {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl<T, E: Display> From<Result<T, E>> for ServiceResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
