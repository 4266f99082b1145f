//! Fault-injecting store double shared by the service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_auth::TokenHash;
use gatehouse_core::{RoleId, TenantId, UserId};
use gatehouse_store::{
    CatalogStore, MemoryStore, PageQuery, Role, RoleGrant, StoreError, Tenant, Token, TokenStore,
    User,
};
use std::sync::atomic::{AtomicU32, Ordering};

/// A [`MemoryStore`] wrapper with injectable failures: a budget of
/// transient `Unavailable` errors consumed by read operations, and an
/// optional mode where every token insert reports a conflict.
pub(crate) struct FaultStore {
    pub inner: MemoryStore,
    read_failures: AtomicU32,
    conflict_token_inserts: bool,
}

impl FaultStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            read_failures: AtomicU32::new(0),
            conflict_token_inserts: false,
        }
    }

    /// Fail the next `n` reads with `Unavailable`.
    pub fn failing_reads(self, n: u32) -> Self {
        self.read_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Report a conflict on every token insert.
    pub fn conflicting_token_inserts(mut self) -> Self {
        self.conflict_token_inserts = true;
        self
    }

    fn trip(&self) -> Result<(), StoreError> {
        if self
            .read_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            Err(StoreError::Unavailable("injected outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogStore for FaultStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.inner.insert_user(user).await
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.trip()?;
        self.inner.user_by_id(id).await
    }

    async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        self.trip()?;
        self.inner.user_by_name(name).await
    }

    async fn update_user(&self, user: User) -> Result<bool, StoreError> {
        self.inner.update_user(user).await
    }

    async fn list_users(&self, page: PageQuery) -> Result<Vec<User>, StoreError> {
        self.trip()?;
        self.inner.list_users(page).await
    }

    async fn insert_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        self.inner.insert_tenant(tenant).await
    }

    async fn tenant_by_id(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        self.trip()?;
        self.inner.tenant_by_id(id).await
    }

    async fn tenant_by_name(&self, name: &str) -> Result<Option<Tenant>, StoreError> {
        self.trip()?;
        self.inner.tenant_by_name(name).await
    }

    async fn update_tenant(&self, tenant: Tenant) -> Result<bool, StoreError> {
        self.inner.update_tenant(tenant).await
    }

    async fn list_tenants(&self, page: PageQuery) -> Result<Vec<Tenant>, StoreError> {
        self.trip()?;
        self.inner.list_tenants(page).await
    }

    async fn tenants_for_user(&self, user_id: UserId) -> Result<Vec<Tenant>, StoreError> {
        self.trip()?;
        self.inner.tenants_for_user(user_id).await
    }

    async fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        self.inner.insert_role(role).await
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        self.trip()?;
        self.inner.role_by_id(id).await
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        self.trip()?;
        self.inner.role_by_name(name).await
    }

    async fn list_roles(&self, page: PageQuery) -> Result<Vec<Role>, StoreError> {
        self.trip()?;
        self.inner.list_roles(page).await
    }

    async fn insert_grant(&self, grant: RoleGrant) -> Result<(), StoreError> {
        self.inner.insert_grant(grant).await
    }

    async fn delete_grant(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<bool, StoreError> {
        self.inner.delete_grant(user_id, role_id, tenant_id).await
    }

    async fn grants_for_user_on(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<Vec<RoleGrant>, StoreError> {
        self.trip()?;
        self.inner.grants_for_user_on(user_id, tenant_id).await
    }

    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        self.trip()?;
        self.inner.grants_for_user(user_id).await
    }
}

#[async_trait]
impl TokenStore for FaultStore {
    async fn insert_token(&self, token: Token) -> Result<(), StoreError> {
        if self.conflict_token_inserts {
            return Err(StoreError::Conflict { resource: "Token" });
        }
        self.inner.insert_token(token).await
    }

    async fn token_by_hash(&self, hash: &TokenHash) -> Result<Option<Token>, StoreError> {
        self.trip()?;
        self.inner.token_by_hash(hash).await
    }

    async fn delete_token(&self, hash: &TokenHash) -> Result<bool, StoreError> {
        self.inner.delete_token(hash).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.inner.delete_expired(now).await
    }
}
