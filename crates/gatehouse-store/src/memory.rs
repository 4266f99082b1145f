//! In-memory store implementation.
//!
//! Backs the engine in tests and single-process deployments. All maps live
//! under one `tokio::sync::RwLock`; uniqueness checks and insert-if-absent
//! happen under the write lock, which makes the store the single point of
//! serialization the concurrency model requires. Readers take a consistent
//! snapshot under the read lock, so a sweeper delete never removes a token
//! mid-validation.

use crate::error::StoreError;
use crate::models::{Role, RoleGrant, Tenant, Token, User};
use crate::store::{CatalogStore, PageQuery, TokenStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_auth::TokenHash;
use gatehouse_core::{RoleId, TenantId, UserId};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GrantKey {
    user: Uuid,
    role: Uuid,
    tenant: Option<Uuid>,
}

impl GrantKey {
    fn of(grant: &RoleGrant) -> Self {
        Self {
            user: *grant.user_id.as_uuid(),
            role: *grant.role_id.as_uuid(),
            tenant: grant.tenant_id.map(|t| *t.as_uuid()),
        }
    }
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    user_names: HashMap<String, Uuid>,
    tenants: HashMap<Uuid, Tenant>,
    tenant_names: HashMap<String, Uuid>,
    roles: HashMap<Uuid, Role>,
    role_names: HashMap<String, Uuid>,
    grants: HashMap<GrantKey, RoleGrant>,
    tokens: HashMap<String, Token>,
}

/// In-memory [`CatalogStore`] + [`TokenStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Id-ordered marker pagination over an unordered map's values.
fn page_by_id<T: Clone>(values: impl Iterator<Item = T>, id_of: impl Fn(&T) -> Uuid, page: PageQuery) -> Vec<T> {
    let mut items: Vec<T> = values.collect();
    items.sort_by_key(&id_of);
    items
        .into_iter()
        .filter(|item| page.marker.map_or(true, |marker| id_of(item) > marker))
        .take(page.limit)
        .collect()
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = *user.id.as_uuid();
        if inner.users.contains_key(&id) || inner.user_names.contains_key(&user.name) {
            return Err(StoreError::Conflict { resource: "User" });
        }
        inner.user_names.insert(user.name.clone(), id);
        inner.users.insert(id, user);
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(id.as_uuid()).cloned())
    }

    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .user_names
            .get(name)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn update_user(&self, user: User) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let id = *user.id.as_uuid();
        match inner.users.get(&id) {
            None => Ok(false),
            Some(existing) => {
                // Names are immutable after creation; the unique index
                // stays consistent without a rename path.
                debug_assert_eq!(existing.name, user.name);
                inner.users.insert(id, user);
                Ok(true)
            }
        }
    }

    async fn list_users(&self, page: PageQuery) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(page_by_id(
            inner.users.values().cloned(),
            |u| *u.id.as_uuid(),
            page,
        ))
    }

    async fn insert_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = *tenant.id.as_uuid();
        if inner.tenants.contains_key(&id) || inner.tenant_names.contains_key(&tenant.name) {
            return Err(StoreError::Conflict { resource: "Tenant" });
        }
        inner.tenant_names.insert(tenant.name.clone(), id);
        inner.tenants.insert(id, tenant);
        Ok(())
    }

    async fn tenant_by_id(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.inner.read().await.tenants.get(id.as_uuid()).cloned())
    }

    async fn tenant_by_name(&self, name: &str) -> Result<Option<Tenant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tenant_names
            .get(name)
            .and_then(|id| inner.tenants.get(id))
            .cloned())
    }

    async fn update_tenant(&self, tenant: Tenant) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let id = *tenant.id.as_uuid();
        match inner.tenants.get(&id) {
            None => Ok(false),
            Some(existing) => {
                debug_assert_eq!(existing.name, tenant.name);
                inner.tenants.insert(id, tenant);
                Ok(true)
            }
        }
    }

    async fn list_tenants(&self, page: PageQuery) -> Result<Vec<Tenant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(page_by_id(
            inner.tenants.values().cloned(),
            |t| *t.id.as_uuid(),
            page,
        ))
    }

    async fn tenants_for_user(&self, user_id: UserId) -> Result<Vec<Tenant>, StoreError> {
        let inner = self.inner.read().await;
        let tenant_ids: BTreeSet<Uuid> = inner
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .filter_map(|g| g.tenant_id.map(|t| *t.as_uuid()))
            .collect();
        Ok(tenant_ids
            .into_iter()
            .filter_map(|id| inner.tenants.get(&id).cloned())
            .collect())
    }

    async fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = *role.id.as_uuid();
        if inner.roles.contains_key(&id) || inner.role_names.contains_key(&role.name) {
            return Err(StoreError::Conflict { resource: "Role" });
        }
        inner.role_names.insert(role.name.clone(), id);
        inner.roles.insert(id, role);
        Ok(())
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.inner.read().await.roles.get(id.as_uuid()).cloned())
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .role_names
            .get(name)
            .and_then(|id| inner.roles.get(id))
            .cloned())
    }

    async fn list_roles(&self, page: PageQuery) -> Result<Vec<Role>, StoreError> {
        let inner = self.inner.read().await;
        Ok(page_by_id(
            inner.roles.values().cloned(),
            |r| *r.id.as_uuid(),
            page,
        ))
    }

    async fn insert_grant(&self, grant: RoleGrant) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = GrantKey::of(&grant);
        if inner.grants.contains_key(&key) {
            return Err(StoreError::Conflict {
                resource: "RoleGrant",
            });
        }
        inner.grants.insert(key, grant);
        Ok(())
    }

    async fn delete_grant(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let key = GrantKey {
            user: *user_id.as_uuid(),
            role: *role_id.as_uuid(),
            tenant: tenant_id.map(|t| *t.as_uuid()),
        };
        Ok(inner.grants.remove(&key).is_some())
    }

    async fn grants_for_user_on(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<Vec<RoleGrant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .grants
            .values()
            .filter(|g| g.user_id == user_id && g.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: Token) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = token.hash.as_str().to_string();
        if inner.tokens.contains_key(&key) {
            return Err(StoreError::Conflict { resource: "Token" });
        }
        inner.tokens.insert(key, token);
        Ok(())
    }

    async fn token_by_hash(&self, hash: &TokenHash) -> Result<Option<Token>, StoreError> {
        Ok(self.inner.read().await.tokens.get(hash.as_str()).cloned())
    }

    async fn delete_token(&self, hash: &TokenHash) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tokens.remove(hash.as_str()).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.tokens.len();
        inner.tokens.retain(|_, token| !token.is_expired(now));
        Ok((before - inner.tokens.len()) as u64)
    }
}
