//! Admin catalog management: users, tenants, roles, and role grants.

use crate::models::{Page, UserSummary};
use gatehouse_auth::PasswordHasher;
use gatehouse_core::{GateError, Result, RoleId, TenantId, UserId};
use gatehouse_store::{Role, RoleGrant, Store, Tenant, User};
use std::sync::Arc;

/// The catalog service behind the admin operations.
///
/// Pure CRUD plus grant bookkeeping; privilege checks happen in the
/// [`Gate`](crate::services::Gate) before any of these run.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    page_limit: usize,
}

impl Catalog {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, page_limit: usize) -> Self {
        Self {
            store,
            hasher,
            page_limit,
        }
    }

    // Users

    /// Create an enabled user with the given name and password.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a blank name or empty password, or when the name
    /// is already taken.
    pub async fn create_user(&self, name: &str, password: &str) -> Result<UserSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GateError::bad_request("user name must not be blank"));
        }
        if password.is_empty() {
            return Err(GateError::bad_request("password must not be empty"));
        }

        let hash = self
            .hasher
            .hash(password)
            .map_err(|e| GateError::StoreUnavailable {
                message: format!("password hashing failed: {e}"),
            })?;

        let user = User::new(name, hash);
        let summary = UserSummary::from(&user);
        self.store.insert_user(user).await?;
        tracing::info!(user_id = %summary.id, name, "created user");
        Ok(summary)
    }

    /// Fetch a user.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such user exists.
    pub async fn get_user(&self, id: UserId) -> Result<UserSummary> {
        let user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("User", id.to_string()))?;
        Ok(UserSummary::from(&user))
    }

    /// List users in id order.
    pub async fn list_users(&self, page: Page) -> Result<Vec<UserSummary>> {
        let users = self.store.list_users(page.query(self.page_limit)).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Enable or disable a user. Disabling invalidates the user's
    /// outstanding tokens on their next validation.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such user exists.
    pub async fn set_user_enabled(&self, id: UserId, enabled: bool) -> Result<UserSummary> {
        let mut user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("User", id.to_string()))?;
        user.enabled = enabled;
        let summary = UserSummary::from(&user);
        if !self.store.update_user(user).await? {
            return Err(GateError::not_found("User", id.to_string()));
        }
        tracing::info!(user_id = %id, enabled, "updated user enablement");
        Ok(summary)
    }

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// `BadRequest` for an empty password; `NotFound` if no such user
    /// exists.
    pub async fn set_user_password(&self, id: UserId, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(GateError::bad_request("password must not be empty"));
        }
        let mut user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("User", id.to_string()))?;
        user.password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| GateError::StoreUnavailable {
                message: format!("password hashing failed: {e}"),
            })?;
        if !self.store.update_user(user).await? {
            return Err(GateError::not_found("User", id.to_string()));
        }
        tracing::info!(user_id = %id, "replaced user password");
        Ok(())
    }

    // Tenants

    /// Create an enabled tenant.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a blank name or when the name is already taken.
    pub async fn create_tenant(&self, name: &str, description: &str) -> Result<Tenant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GateError::bad_request("tenant name must not be blank"));
        }
        let tenant = Tenant::new(name, description);
        self.store.insert_tenant(tenant.clone()).await?;
        tracing::info!(tenant_id = %tenant.id, name, "created tenant");
        Ok(tenant)
    }

    /// Fetch a tenant.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such tenant exists.
    pub async fn get_tenant(&self, id: TenantId) -> Result<Tenant> {
        self.store
            .tenant_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("Tenant", id.to_string()))
    }

    /// List tenants in id order.
    pub async fn list_tenants(&self, page: Page) -> Result<Vec<Tenant>> {
        Ok(self.store.list_tenants(page.query(self.page_limit)).await?)
    }

    /// Enable or disable a tenant. Disabling blocks new scoping and kills
    /// existing scoped tokens at validation time.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such tenant exists.
    pub async fn set_tenant_enabled(&self, id: TenantId, enabled: bool) -> Result<Tenant> {
        let mut tenant = self
            .store
            .tenant_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("Tenant", id.to_string()))?;
        tenant.enabled = enabled;
        if !self.store.update_tenant(tenant.clone()).await? {
            return Err(GateError::not_found("Tenant", id.to_string()));
        }
        tracing::info!(tenant_id = %id, enabled, "updated tenant enablement");
        Ok(tenant)
    }

    // Roles

    /// Create a catalog role.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a blank name or when the name is already taken.
    pub async fn create_role(&self, name: &str) -> Result<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GateError::bad_request("role name must not be blank"));
        }
        let role = Role::new(name);
        self.store.insert_role(role.clone()).await?;
        tracing::info!(role_id = %role.id, name, "created role");
        Ok(role)
    }

    /// Fetch a role.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such role exists.
    pub async fn get_role(&self, id: RoleId) -> Result<Role> {
        self.store
            .role_by_id(id)
            .await?
            .ok_or_else(|| GateError::not_found("Role", id.to_string()))
    }

    /// List roles in id order.
    pub async fn list_roles(&self, page: Page) -> Result<Vec<Role>> {
        Ok(self.store.list_roles(page.query(self.page_limit)).await?)
    }

    // Grants

    /// Grant a role to a user, globally or on one tenant.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user, role, or tenant does not exist;
    /// `BadRequest` if the identical grant already exists.
    pub async fn grant_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<()> {
        if self.store.user_by_id(user_id).await?.is_none() {
            return Err(GateError::not_found("User", user_id.to_string()));
        }
        if self.store.role_by_id(role_id).await?.is_none() {
            return Err(GateError::not_found("Role", role_id.to_string()));
        }
        if let Some(tenant_id) = tenant_id {
            if self.store.tenant_by_id(tenant_id).await?.is_none() {
                return Err(GateError::not_found("Tenant", tenant_id.to_string()));
            }
        }

        self.store
            .insert_grant(RoleGrant::new(user_id, role_id, tenant_id))
            .await?;
        tracing::info!(
            user_id = %user_id,
            role_id = %role_id,
            tenant_id = ?tenant_id,
            "granted role"
        );
        Ok(())
    }

    /// Revoke a grant by its (user, role, tenant) triple. Takes effect on
    /// the next validation of any affected token.
    ///
    /// # Errors
    ///
    /// `NotFound` if the grant does not exist.
    pub async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<()> {
        if !self.store.delete_grant(user_id, role_id, tenant_id).await? {
            return Err(GateError::NotFound {
                resource: "Grant".into(),
                id: None,
            });
        }
        tracing::info!(
            user_id = %user_id,
            role_id = %role_id,
            tenant_id = ?tenant_id,
            "revoked role"
        );
        Ok(())
    }

    /// All tenants where the user holds at least one grant, in id order.
    pub async fn tenants_for_user(&self, user_id: UserId) -> Result<Vec<Tenant>> {
        Ok(self.store.tenants_for_user(user_id).await?)
    }
}
