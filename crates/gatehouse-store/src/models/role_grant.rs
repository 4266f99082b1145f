//! Role grant entity model.

use chrono::{DateTime, Utc};
use gatehouse_core::{RoleId, TenantId, UserId};

/// A (user, role, tenant) authorization triple.
///
/// `tenant_id = None` is a global grant, applying in every context. At most
/// one grant exists per triple; the store's insert-if-absent enforces this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// The user holding the grant.
    pub user_id: UserId,

    /// The granted role.
    pub role_id: RoleId,

    /// The tenant the grant applies to, or `None` for a global grant.
    pub tenant_id: Option<TenantId>,

    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

impl RoleGrant {
    /// Create a new grant.
    #[must_use]
    pub fn new(user_id: UserId, role_id: RoleId, tenant_id: Option<TenantId>) -> Self {
        Self {
            user_id,
            role_id,
            tenant_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this grant applies in every tenant context.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.tenant_id.is_none()
    }
}
