//! Tenant scoping: unscoped token plus tenant in, scoped token out.

use crate::models::Access;
use crate::services::support::{build_access, mint_token};
use chrono::Utc;
use gatehouse_auth::TokenId;
use gatehouse_core::{GateError, Result, TenantId, ADMIN_ROLE};
use gatehouse_store::Store;
use std::sync::Arc;

/// Issues tenant-scoped tokens conditioned on role grants.
///
/// Membership requires at least one grant on the tenant whose role is not
/// `Admin`: Admin is a superuser capability for managing tenants and
/// users, not a tenant-membership signal, so an Admin-only grant does not
/// authorize scoping.
#[derive(Clone)]
pub struct Scoper {
    store: Arc<dyn Store>,
    token_ttl: chrono::Duration,
}

impl Scoper {
    /// Create a new scoper.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, token_ttl: chrono::Duration) -> Self {
        Self { store, token_ttl }
    }

    /// Exchange a valid token for a new token scoped to `tenant_id`.
    ///
    /// The presented token stays valid and independent; tokens are never
    /// chained or invalidated by scoping.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is absent/expired or the user lacks a
    /// non-Admin grant on the tenant; `NotFound` if the tenant does not
    /// exist or is disabled.
    pub async fn scope(&self, token: &TokenId, tenant_id: TenantId) -> Result<Access> {
        let record = self
            .store
            .token_by_hash(&token.hash())
            .await?
            .filter(|t| !t.is_expired(Utc::now()))
            .ok_or_else(GateError::unauthorized)?;

        let user = self
            .store
            .user_by_id(record.user_id)
            .await?
            .filter(|u| u.enabled)
            .ok_or_else(GateError::unauthorized)?;

        let tenant = self
            .store
            .tenant_by_id(tenant_id)
            .await?
            .filter(|t| t.enabled)
            .ok_or_else(|| GateError::not_found("Tenant", tenant_id.to_string()))?;

        if !self.holds_membership_grant(&user.id, tenant_id).await? {
            return Err(GateError::unauthorized());
        }

        let (token_id, record) =
            mint_token(self.store.as_ref(), user.id, Some(tenant_id), self.token_ttl).await?;
        tracing::info!(user_id = %user.id, tenant_id = %tenant_id, "issued scoped token");

        build_access(self.store.as_ref(), &user, token_id, &record, Some(&tenant)).await
    }

    /// At least one grant on the tenant with a role other than Admin.
    async fn holds_membership_grant(
        &self,
        user_id: &gatehouse_core::UserId,
        tenant_id: TenantId,
    ) -> Result<bool> {
        let grants = self
            .store
            .grants_for_user_on(*user_id, Some(tenant_id))
            .await?;
        for grant in grants {
            if let Some(role) = self.store.role_by_id(grant.role_id).await? {
                if role.name != ADMIN_ROLE {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
