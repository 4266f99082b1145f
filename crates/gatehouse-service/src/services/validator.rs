//! Token validation: token in, current claims out.

use crate::models::{Claims, TenantRef};
use crate::services::support::resolve_role_names;
use chrono::Utc;
use gatehouse_auth::TokenId;
use gatehouse_core::{GateError, Result, TenantId};
use gatehouse_store::Store;
use std::sync::Arc;

/// Resolves a token id into current identity/role/tenant claims.
///
/// The same contract serves the token's owner and privileged callers
/// validating someone else's token; privilege is checked by the
/// [`Gate`](crate::services::Gate), never here.
#[derive(Clone)]
pub struct Validator {
    store: Arc<dyn Store>,
}

impl Validator {
    /// Create a new validator.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate a token and return its claims.
    ///
    /// When `expected_tenant` is given, a token scoped elsewhere (or not
    /// scoped at all) fails `Unauthorized`; this blocks cross-tenant token
    /// replay.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is absent or expired, the owning user
    /// is disabled, the scope tenant is gone or disabled, or a scoped
    /// token's (user, tenant) pair no longer holds any grant.
    pub async fn validate(
        &self,
        token: &TokenId,
        expected_tenant: Option<TenantId>,
    ) -> Result<Claims> {
        let record = self
            .store
            .token_by_hash(&token.hash())
            .await?
            .filter(|t| !t.is_expired(Utc::now()))
            .ok_or_else(GateError::unauthorized)?;

        if let Some(expected) = expected_tenant {
            if record.tenant_id != Some(expected) {
                return Err(GateError::unauthorized());
            }
        }

        let user = self
            .store
            .user_by_id(record.user_id)
            .await?
            .filter(|u| u.enabled)
            .ok_or_else(GateError::unauthorized)?;

        let tenant = match record.tenant_id {
            None => None,
            Some(tenant_id) => {
                let tenant = self
                    .store
                    .tenant_by_id(tenant_id)
                    .await?
                    .filter(|t| t.enabled)
                    .ok_or_else(GateError::unauthorized)?;

                // A scoped token is only as valid as its membership: if
                // every grant on the tenant has been revoked since mint,
                // the token dies even though its id was never revoked.
                let grants = self
                    .store
                    .grants_for_user_on(user.id, Some(tenant_id))
                    .await?;
                if grants.is_empty() {
                    return Err(GateError::unauthorized());
                }

                Some(TenantRef {
                    id: tenant.id,
                    name: tenant.name.clone(),
                })
            }
        };

        let roles = resolve_role_names(self.store.as_ref(), user.id, record.tenant_id).await?;

        Ok(Claims {
            user_id: user.id,
            username: user.name,
            tenant,
            roles,
            expires_at: record.expires_at,
        })
    }
}
