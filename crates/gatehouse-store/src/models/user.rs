//! User entity model.

use chrono::{DateTime, Utc};
use gatehouse_core::UserId;

/// A user account.
///
/// Names are globally unique. The password is held only as an Argon2id
/// hash and is never returned to callers. Users referenced by tokens are
/// never physically deleted; they are soft-disabled instead.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,

    /// Login name (globally unique).
    pub name: String,

    /// Argon2id password hash (PHC string).
    pub password_hash: String,

    /// Whether the account may authenticate. Disabled users fail
    /// authentication identically to unknown users.
    pub enabled: bool,

    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new enabled user.
    #[must_use]
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            password_hash: password_hash.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}
