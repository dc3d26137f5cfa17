// Comment moderation service - core business logic for new comments.
//
// This service handles:
// - Validating and storing new comments
// - Deciding approve / reject / pending for each new comment
// - Admin approve/reject overrides
// - Periodic re-checks of the review queue
//
// NO database or HTTP dependencies here - just pure domain logic.

use super::comment_models::{
    validate_body, Comment, ModerationConfig, ModerationReport, ModerationStatus, NewComment,
    RejectionReason, SweepSummary,
};
use super::comment_policy::CommentPolicy;
use super::spam_heuristics::SpamHeuristics;
use crate::core::notifications::Notifier;
use crate::core::users::User;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Comment not found: {0}")]
    NotFound(i64),

    #[error("Not authorized: {0}")]
    Unauthorized(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Insert a new comment. It starts out pending.
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, CommentError>;

    async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, CommentError>;

    /// How many of this author's comments are currently approved.
    async fn count_approved_by_author(&self, user_id: i64) -> Result<u64, CommentError>;

    /// Overwrite the moderation status. Fails with `NotFound` for unknown ids.
    async fn update_status(
        &self,
        comment_id: i64,
        status: ModerationStatus,
    ) -> Result<Comment, CommentError>;

    async fn update_body(&self, comment_id: i64, body: &str) -> Result<Comment, CommentError>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_comment(&self, comment_id: i64) -> Result<bool, CommentError>;

    /// Comments in the given status, oldest first.
    async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: usize,
    ) -> Result<Vec<Comment>, CommentError>;

    /// Like `list_by_status`, but only comments with an id above `after_id`.
    async fn list_by_status_after(
        &self,
        status: ModerationStatus,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<Comment>, CommentError>;

    /// Approved comments on a post, newest first.
    async fn list_approved_for_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The verdict for a single comment before it is written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: ModerationStatus,
    pub reasons: Vec<RejectionReason>,
}

pub struct CommentModerationService<S: CommentStore, N: Notifier> {
    store: S,
    notifier: N,
    heuristics: SpamHeuristics,
    config: ModerationConfig,
    policy: CommentPolicy,
    /// Id of the last comment the sweep looked at. 0 means start over.
    sweep_cursor: AtomicI64,
}

impl<S: CommentStore, N: Notifier> CommentModerationService<S, N> {
    pub fn new(store: S, notifier: N, config: ModerationConfig, policy: CommentPolicy) -> Self {
        Self {
            store,
            notifier,
            heuristics: SpamHeuristics::from_config(&config),
            config,
            policy,
            sweep_cursor: AtomicI64::new(0),
        }
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Validate, store and moderate a new comment in one go.
    ///
    /// Nothing is written if the body fails validation.
    pub async fn submit_comment(
        &self,
        author: &User,
        post_id: i64,
        body: &str,
    ) -> Result<ModerationReport, CommentError> {
        if !self.policy.can_create(author) {
            return Err(CommentError::Unauthorized(
                "You can't comment on this post".to_string(),
            ));
        }

        let new_comment = NewComment {
            post_id,
            user_id: author.id,
            body: body.to_string(),
        };
        new_comment.validate()?;

        let comment = self.store.create_comment(new_comment).await?;
        self.moderate(&comment).await
    }

    /// Decide what happens to a comment and store the result.
    ///
    /// Exactly one status write per call. On write failure the error is
    /// returned as-is and nobody is notified.
    pub async fn moderate(&self, comment: &Comment) -> Result<ModerationReport, CommentError> {
        self.apply_decision(comment, true).await
    }

    /// Look a comment up by id and moderate it.
    pub async fn moderate_by_id(&self, comment_id: i64) -> Result<ModerationReport, CommentError> {
        let comment = self.find(comment_id).await?;
        self.moderate(&comment).await
    }

    /// Work out the outcome without writing anything.
    ///
    /// Rejection wins over everything else; the author's history is only
    /// consulted for comments that pass the heuristics.
    pub async fn decide(&self, comment: &Comment) -> Result<Decision, CommentError> {
        let reasons = self.rejection_reasons(&comment.body);
        if !reasons.is_empty() {
            return Ok(Decision {
                outcome: ModerationStatus::Rejected,
                reasons,
            });
        }

        let approved_count = self
            .store
            .count_approved_by_author(comment.user_id)
            .await?;

        let outcome = if approved_count >= self.config.trust_threshold {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Pending
        };

        Ok(Decision {
            outcome,
            reasons: Vec::new(),
        })
    }

    fn rejection_reasons(&self, body: &str) -> Vec<RejectionReason> {
        let signals = self.heuristics.evaluate(body);
        let mut reasons = Vec::new();

        if signals.contains_spam_keywords {
            reasons.push(RejectionReason::SpamKeywords);
        }
        if signals.has_suspicious_links {
            reasons.push(RejectionReason::SuspiciousLinks);
        }
        if body.chars().count() < self.config.min_body_chars {
            reasons.push(RejectionReason::TooShort);
        }

        reasons
    }

    async fn apply_decision(
        &self,
        comment: &Comment,
        notify_pending: bool,
    ) -> Result<ModerationReport, CommentError> {
        let decision = self.decide(comment).await?;

        let updated = match self.store.update_status(comment.id, decision.outcome).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(
                    comment_id = comment.id,
                    outcome = %decision.outcome,
                    "Failed to store moderation outcome: {}",
                    e
                );
                return Err(e);
            }
        };

        match decision.outcome {
            ModerationStatus::Approved => self.notifier.notify_post_author(&updated),
            ModerationStatus::Pending if notify_pending => {
                self.notifier.notify_moderators(&updated)
            }
            _ => {}
        }

        tracing::info!(
            comment_id = updated.id,
            user_id = updated.user_id,
            post_id = updated.post_id,
            outcome = %decision.outcome,
            "Comment moderated"
        );

        Ok(ModerationReport {
            comment: updated,
            outcome: decision.outcome,
            reasons: decision.reasons,
        })
    }

    /// Admin override: mark a comment approved. Safe to repeat.
    pub async fn approve(&self, actor: &User, comment_id: i64) -> Result<Comment, CommentError> {
        if !self.policy.can_approve(actor) {
            return Err(CommentError::Unauthorized(
                "Only admins can approve comments".to_string(),
            ));
        }
        self.store
            .update_status(comment_id, ModerationStatus::Approved)
            .await
    }

    /// Admin override: mark a comment rejected. Safe to repeat.
    pub async fn reject(&self, actor: &User, comment_id: i64) -> Result<Comment, CommentError> {
        if !self.policy.can_reject(actor) {
            return Err(CommentError::Unauthorized(
                "Only admins can reject comments".to_string(),
            ));
        }
        self.store
            .update_status(comment_id, ModerationStatus::Rejected)
            .await
    }

    /// Change the body of your own comment. Edits are not re-moderated.
    pub async fn edit_comment(
        &self,
        actor: &User,
        comment_id: i64,
        body: &str,
    ) -> Result<Comment, CommentError> {
        let comment = self.find(comment_id).await?;
        if !self.policy.can_update(actor, &comment) {
            return Err(CommentError::Unauthorized(
                "You can only edit your own comments".to_string(),
            ));
        }
        validate_body(body)?;
        self.store.update_body(comment_id, body).await
    }

    pub async fn delete_comment(&self, actor: &User, comment_id: i64) -> Result<(), CommentError> {
        let comment = self.find(comment_id).await?;
        if !self.policy.can_destroy(actor, &comment) {
            return Err(CommentError::Unauthorized(
                "You can't delete this comment".to_string(),
            ));
        }
        if !self.store.delete_comment(comment_id).await? {
            return Err(CommentError::NotFound(comment_id));
        }
        Ok(())
    }

    pub async fn approved_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<Comment>, CommentError> {
        self.store.list_approved_for_post(post_id).await
    }

    /// Comments waiting for a moderator, oldest first.
    pub async fn review_queue(&self, limit: usize) -> Result<Vec<Comment>, CommentError> {
        self.store
            .list_by_status(ModerationStatus::Pending, limit)
            .await
    }

    /// Re-run moderation over the next page of pending comments.
    ///
    /// Each call picks up after the last comment the previous call examined
    /// and starts over from the oldest once a page comes back short.
    ///
    /// Authors who have earned trust since commenting get promoted. Comments
    /// that stay pending don't ping the moderators a second time. A failed
    /// write is logged and counted; the rest of the batch still runs.
    pub async fn sweep_pending(&self, limit: usize) -> Result<SweepSummary, CommentError> {
        let after_id = self.sweep_cursor.load(Ordering::SeqCst);
        let queue = self
            .store
            .list_by_status_after(ModerationStatus::Pending, after_id, limit)
            .await?;

        let next_cursor = match queue.last() {
            Some(last) if queue.len() >= limit => last.id,
            _ => 0,
        };
        self.sweep_cursor.store(next_cursor, Ordering::SeqCst);

        let mut summary = SweepSummary::default();

        for comment in &queue {
            summary.examined += 1;
            match self.apply_decision(comment, false).await {
                Ok(report) => match report.outcome {
                    ModerationStatus::Approved => summary.approved += 1,
                    ModerationStatus::Rejected => summary.rejected += 1,
                    ModerationStatus::Pending => summary.still_pending += 1,
                },
                Err(e) => {
                    tracing::warn!(comment_id = comment.id, "Sweep skipped comment: {}", e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Sweep every `every` until `shutdown` resolves.
    ///
    /// `shutdown` is pinned once for the whole run; if it resolves while a
    /// sweep is in flight the loop stops as soon as that sweep finishes.
    pub async fn run_sweeps<F>(&self, every: Duration, limit: usize, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(every);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::debug!("Starting review sweep...");
                    match self.sweep_pending(limit).await {
                        Ok(summary) if summary.examined > 0 => tracing::info!(
                            examined = summary.examined,
                            approved = summary.approved,
                            rejected = summary.rejected,
                            still_pending = summary.still_pending,
                            failed = summary.failed,
                            "Review sweep finished"
                        ),
                        Ok(_) => tracing::debug!("Review queue empty"),
                        Err(e) => tracing::warn!("Review sweep failed: {}", e),
                    }
                }
                _ = &mut shutdown => break,
            }
        }
    }

    async fn find(&self, comment_id: i64) -> Result<Comment, CommentError> {
        self.store
            .get_comment(comment_id)
            .await?
            .ok_or(CommentError::NotFound(comment_id))
    }
}

// ============================================================================
// TESTS
// ============================================================================
