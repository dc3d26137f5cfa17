// Notifier that writes structured log events instead of sending anything.
//
// Good enough until mail delivery exists; the events carry the ids a
// delivery job would need.

use crate::core::comments::Comment;
use crate::core::notifications::Notifier;
use crate::core::posts::Post;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_post_author(&self, comment: &Comment) {
        tracing::info!(
            target: "notifications",
            comment_id = comment.id,
            post_id = comment.post_id,
            "New approved comment for post author"
        );
    }

    fn notify_moderators(&self, comment: &Comment) {
        tracing::info!(
            target: "notifications",
            comment_id = comment.id,
            post_id = comment.post_id,
            user_id = comment.user_id,
            "Comment waiting for review"
        );
    }

    fn notify_subscribers(&self, post: &Post) {
        tracing::info!(
            target: "notifications",
            post_id = post.id,
            slug = %post.slug,
            "New post published"
        );
    }
}
