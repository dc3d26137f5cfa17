// Core comments module - moderation and the rest of the comment lifecycle.
// Following the same pattern as the other core modules: models, pure logic, service.

pub mod comment_models;
pub mod comment_policy;
pub mod moderation_service;
pub mod spam_heuristics;

pub use comment_models::*;
pub use comment_policy::CommentPolicy;
pub use moderation_service::*;
pub use spam_heuristics::{SpamHeuristics, SpamSignals, DEFAULT_SPAM_KEYWORDS};
