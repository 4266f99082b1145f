//! Role entity model.

use chrono::{DateTime, Utc};
use gatehouse_core::RoleId;

/// A global catalog role.
///
/// Roles carry no policy of their own; the existence of a [`RoleGrant`]
/// linking a user, a role, and an optional tenant is the sole
/// authorization signal.
///
/// [`RoleGrant`]: crate::models::RoleGrant
#[derive(Debug, Clone)]
pub struct Role {
    /// Unique identifier for the role.
    pub id: RoleId,

    /// Role name (globally unique), e.g. "Member" or "Admin".
    pub name: String,

    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Create a new catalog role.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
