//! The abstract storage interface.
//!
//! The auth core consumes storage exclusively through these traits; the
//! store is the single point of serialization between otherwise stateless
//! request handlers. Reads see at-least read-committed state, and every
//! `insert_*` is an atomic insert-if-absent keyed on the resource's
//! uniqueness constraints.

use crate::error::StoreError;
use crate::models::{Role, RoleGrant, Tenant, Token, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_auth::TokenHash;
use gatehouse_core::{RoleId, TenantId, UserId};
use std::sync::Arc;
use uuid::Uuid;

/// Marker-based pagination for listing operations.
///
/// Items are returned in id order, strictly after `marker`, at most
/// `limit` of them.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    /// Resume listing after this id, or from the start when `None`.
    pub marker: Option<Uuid>,
    /// Maximum number of items to return.
    pub limit: usize,
}

impl PageQuery {
    /// A page starting from the beginning.
    #[must_use]
    pub fn first(limit: usize) -> Self {
        Self {
            marker: None,
            limit,
        }
    }

    /// A page resuming after `marker`.
    #[must_use]
    pub fn after(marker: Uuid, limit: usize) -> Self {
        Self {
            marker: Some(marker),
            limit,
        }
    }
}

/// Storage for users, tenants, roles, and role grants.
///
/// Pure data access: no authorization policy lives here.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Users

    /// Insert a user; fails with [`StoreError::Conflict`] if the id or the
    /// unique name already exists.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;

    /// Fetch a user by id.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user by its unique name.
    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;

    /// Replace a user record by id. Returns whether the user existed.
    async fn update_user(&self, user: User) -> Result<bool, StoreError>;

    /// List users in id order.
    async fn list_users(&self, page: PageQuery) -> Result<Vec<User>, StoreError>;

    // Tenants

    /// Insert a tenant; fails with [`StoreError::Conflict`] on duplicate id
    /// or name.
    async fn insert_tenant(&self, tenant: Tenant) -> Result<(), StoreError>;

    /// Fetch a tenant by id.
    async fn tenant_by_id(&self, id: TenantId) -> Result<Option<Tenant>, StoreError>;

    /// Fetch a tenant by its unique name.
    async fn tenant_by_name(&self, name: &str) -> Result<Option<Tenant>, StoreError>;

    /// Replace a tenant record by id. Returns whether the tenant existed.
    async fn update_tenant(&self, tenant: Tenant) -> Result<bool, StoreError>;

    /// List tenants in id order.
    async fn list_tenants(&self, page: PageQuery) -> Result<Vec<Tenant>, StoreError>;

    /// All tenants where the user holds at least one grant, in id order.
    async fn tenants_for_user(&self, user_id: UserId) -> Result<Vec<Tenant>, StoreError>;

    // Roles

    /// Insert a role; fails with [`StoreError::Conflict`] on duplicate id
    /// or name.
    async fn insert_role(&self, role: Role) -> Result<(), StoreError>;

    /// Fetch a role by id.
    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    /// Fetch a role by its unique name.
    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;

    /// List roles in id order.
    async fn list_roles(&self, page: PageQuery) -> Result<Vec<Role>, StoreError>;

    // Grants

    /// Insert a grant; fails with [`StoreError::Conflict`] if the
    /// (user, role, tenant) triple already exists.
    async fn insert_grant(&self, grant: RoleGrant) -> Result<(), StoreError>;

    /// Delete a grant by its triple. Returns whether it existed.
    async fn delete_grant(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<bool, StoreError>;

    /// Range query: all grants for (user, tenant). `tenant_id = None`
    /// selects the user's global grants.
    async fn grants_for_user_on(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<Vec<RoleGrant>, StoreError>;

    /// All grants for a user, global and tenant-scoped.
    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError>;
}

/// Storage for issued tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Atomic insert-if-absent keyed on the token hash; fails with
    /// [`StoreError::Conflict`] if the hash is already present.
    async fn insert_token(&self, token: Token) -> Result<(), StoreError>;

    /// Fetch a token by the hash of its opaque id.
    async fn token_by_hash(&self, hash: &TokenHash) -> Result<Option<Token>, StoreError>;

    /// Revoke a token. Returns whether it existed.
    async fn delete_token(&self, hash: &TokenHash) -> Result<bool, StoreError>;

    /// Remove all tokens expired as of `now`; returns the purge count.
    /// Used by the background sweeper.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// A complete store: catalog plus tokens.
pub trait Store: CatalogStore + TokenStore {}

impl<S: CatalogStore + TokenStore> Store for S {}

// Store handles are shared as `Arc<dyn Store>`; delegating through `Arc`
// lets adapters such as [`RetryingStore`](crate::RetryingStore) wrap an
// already-shared store.
#[async_trait]
impl<S: CatalogStore + ?Sized> CatalogStore for Arc<S> {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        (**self).insert_user(user).await
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).user_by_id(id).await
    }

    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_name(name).await
    }

    async fn update_user(&self, user: User) -> Result<bool, StoreError> {
        (**self).update_user(user).await
    }

    async fn list_users(&self, page: PageQuery) -> Result<Vec<User>, StoreError> {
        (**self).list_users(page).await
    }

    async fn insert_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        (**self).insert_tenant(tenant).await
    }

    async fn tenant_by_id(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        (**self).tenant_by_id(id).await
    }

    async fn tenant_by_name(&self, name: &str) -> Result<Option<Tenant>, StoreError> {
        (**self).tenant_by_name(name).await
    }

    async fn update_tenant(&self, tenant: Tenant) -> Result<bool, StoreError> {
        (**self).update_tenant(tenant).await
    }

    async fn list_tenants(&self, page: PageQuery) -> Result<Vec<Tenant>, StoreError> {
        (**self).list_tenants(page).await
    }

    async fn tenants_for_user(&self, user_id: UserId) -> Result<Vec<Tenant>, StoreError> {
        (**self).tenants_for_user(user_id).await
    }

    async fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        (**self).insert_role(role).await
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        (**self).role_by_id(id).await
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        (**self).role_by_name(name).await
    }

    async fn list_roles(&self, page: PageQuery) -> Result<Vec<Role>, StoreError> {
        (**self).list_roles(page).await
    }

    async fn insert_grant(&self, grant: RoleGrant) -> Result<(), StoreError> {
        (**self).insert_grant(grant).await
    }

    async fn delete_grant(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<bool, StoreError> {
        (**self).delete_grant(user_id, role_id, tenant_id).await
    }

    async fn grants_for_user_on(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<Vec<RoleGrant>, StoreError> {
        (**self).grants_for_user_on(user_id, tenant_id).await
    }

    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        (**self).grants_for_user(user_id).await
    }
}

#[async_trait]
impl<S: TokenStore + ?Sized> TokenStore for Arc<S> {
    async fn insert_token(&self, token: Token) -> Result<(), StoreError> {
        (**self).insert_token(token).await
    }

    async fn token_by_hash(&self, hash: &TokenHash) -> Result<Option<Token>, StoreError> {
        (**self).token_by_hash(hash).await
    }

    async fn delete_token(&self, hash: &TokenHash) -> Result<bool, StoreError> {
        (**self).delete_token(hash).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        (**self).delete_expired(now).await
    }
}
