//! Tenant entity model.

use chrono::{DateTime, Utc};
use gatehouse_core::TenantId;

/// An isolation domain that tokens can be scoped to.
///
/// Names are globally unique. Disabled tenants cannot be scoped to.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub id: TenantId,

    /// Tenant name (globally unique).
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Whether the tenant accepts scoped tokens.
    pub enabled: bool,

    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new enabled tenant.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TenantId::new(),
            name: name.into(),
            description: description.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}
