// Outbound notifications triggered by domain events.
//
// Notifications are fire-and-forget: services call them after a successful
// write and never wait on, inspect, or retry the delivery.

use crate::core::comments::Comment;
use crate::core::posts::Post;

/// Port for anything that tells people about new activity (email, chat, logs).
pub trait Notifier: Send + Sync {
    /// A comment on one of the author's posts was approved.
    fn notify_post_author(&self, comment: &Comment);

    /// A comment is waiting in the review queue.
    fn notify_moderators(&self, comment: &Comment);

    /// A post was just published.
    fn notify_subscribers(&self, post: &Post);
}
