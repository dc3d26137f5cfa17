// Users as seen by the domain services.
//
// Authentication happens in the web layer; services receive the already
// signed-in user and only need to know who they are and whether they're an admin.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// First and last name, with stray whitespace removed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name if there is one, otherwise the email address.
    pub fn display_name(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            self.email.clone()
        } else {
            full_name
        }
    }
}

/// Decides who counts as an admin.
///
/// There is no role column; the site has a single admin account identified
/// by its email address.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_email: String,
}

impl AccessPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into().trim().to_lowercase(),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        !self.admin_email.is_empty() && user.email.trim().to_lowercase() == self.admin_email
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL)
    }
}
