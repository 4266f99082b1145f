//! Shared helpers for the token-issuing components.

use crate::models::{Access, TenantRef, TokenInfo, UserInfo};
use gatehouse_auth::TokenId;
use gatehouse_core::{GateError, Result, TenantId, UserId};
use gatehouse_store::{Store, StoreError, Tenant, Token, User};
use std::collections::BTreeSet;

/// Attempts before giving up on a token-id hash collision. With 256-bit
/// ids a second attempt should never be needed.
const MINT_ATTEMPTS: u32 = 3;

/// Mint and persist a token: fresh random id, atomic insert-if-absent.
///
/// The insert is the only write of a mint, so a store failure leaves no
/// usable half-written token. On a hash conflict a fresh id is generated;
/// transient store failures are not retried here (the caller retries the
/// whole authenticate/scope call and accepts a fresh token id).
pub(crate) async fn mint_token(
    store: &dyn Store,
    user_id: UserId,
    tenant_id: Option<TenantId>,
    ttl: chrono::Duration,
) -> Result<(TokenId, Token)> {
    for _ in 0..MINT_ATTEMPTS {
        let id = TokenId::generate();
        let token = Token::mint(id.hash(), user_id, tenant_id, ttl);
        match store.insert_token(token.clone()).await {
            Ok(()) => return Ok((id, token)),
            Err(StoreError::Conflict { .. }) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(GateError::StoreUnavailable {
        message: "internal error: token id generation kept colliding".into(),
    })
}

/// Role names in effect for (user, scope), resolved fresh from current
/// grants. Global grants apply in every scope; tenant grants apply only
/// when the scope matches.
pub(crate) async fn resolve_role_names(
    store: &dyn Store,
    user_id: UserId,
    tenant_id: Option<TenantId>,
) -> Result<BTreeSet<String>> {
    let mut grants = store.grants_for_user_on(user_id, None).await?;
    if let Some(tenant_id) = tenant_id {
        grants.extend(store.grants_for_user_on(user_id, Some(tenant_id)).await?);
    }

    let mut names = BTreeSet::new();
    for grant in grants {
        if let Some(role) = store.role_by_id(grant.role_id).await? {
            names.insert(role.name);
        }
    }
    Ok(names)
}

/// Assemble the access document returned by authenticate and scope.
pub(crate) async fn build_access(
    store: &dyn Store,
    user: &User,
    token_id: TokenId,
    token: &Token,
    tenant: Option<&Tenant>,
) -> Result<Access> {
    let roles = resolve_role_names(store, user.id, token.tenant_id).await?;
    Ok(Access {
        token: TokenInfo {
            id: token_id,
            expires: token.expires_at,
            tenant: tenant.map(|t| TenantRef {
                id: t.id,
                name: t.name.clone(),
            }),
        },
        user: UserInfo {
            id: user.id,
            username: user.name.clone(),
            roles: roles.into_iter().collect(),
        },
    })
}
