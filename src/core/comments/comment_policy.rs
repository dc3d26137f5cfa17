// Who may do what with a comment.

use super::comment_models::Comment;
use crate::core::users::{AccessPolicy, User};

#[derive(Debug, Clone, Default)]
pub struct CommentPolicy {
    access: AccessPolicy,
}

impl CommentPolicy {
    pub fn new(access: AccessPolicy) -> Self {
        Self { access }
    }

    /// Any signed-in user may comment.
    pub fn can_create(&self, _user: &User) -> bool {
        true
    }

    pub fn can_update(&self, user: &User, comment: &Comment) -> bool {
        Self::is_owner(user, comment)
    }

    pub fn can_destroy(&self, user: &User, comment: &Comment) -> bool {
        Self::is_owner(user, comment) || self.access.is_admin(user)
    }

    pub fn can_approve(&self, user: &User) -> bool {
        self.access.is_admin(user)
    }

    pub fn can_reject(&self, user: &User) -> bool {
        self.access.is_admin(user)
    }

    fn is_owner(user: &User, comment: &Comment) -> bool {
        user.id == comment.user_id
    }
}
