//! The caller-facing engine: every operation a transport layer maps to a
//! route, with privilege enforcement built in.

use crate::config::GatehouseConfig;
use crate::models::{Access, AuthRequest, Claims, Credentials, Page, UserSummary};
use crate::services::{Authenticator, Catalog, Gate, Scoper, TokenSweeper, Validator};
use gatehouse_auth::{PasswordHasher, TokenId};
use gatehouse_core::{GateError, Result, RoleId, TenantId, UserId, ADMIN_ROLE};
use gatehouse_store::{RetryingStore, Role, RoleGrant, Store, Tenant};
use std::str::FromStr;
use std::sync::Arc;

/// The assembled engine.
///
/// Owns one of each component over a shared store handle. Operations come
/// in three privilege classes: open (authenticate), service (acting on
/// one's own token), and admin (catalog management and validating or
/// revoking other callers' tokens). Privilege failures are `Unauthorized`,
/// same as missing credentials.
pub struct Gatehouse {
    store: Arc<dyn Store>,
    authenticator: Authenticator,
    scoper: Scoper,
    validator: Validator,
    gate: Gate,
    catalog: Catalog,
    hasher: PasswordHasher,
    config: GatehouseConfig,
}

impl Gatehouse {
    /// Assemble the engine with production hashing parameters.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: GatehouseConfig) -> Self {
        Self::with_hasher(store, config, PasswordHasher::new())
    }

    /// Assemble the engine with an explicit hasher. Tests inject cheap
    /// Argon2 parameters here.
    #[must_use]
    pub fn with_hasher(
        store: Arc<dyn Store>,
        config: GatehouseConfig,
        hasher: PasswordHasher,
    ) -> Self {
        // Retries are composed here, once: every component below sees the
        // adapter, which absorbs transient failures on idempotent
        // operations and passes inserts straight through.
        let store: Arc<dyn Store> = Arc::new(RetryingStore::new(store, config.retry));
        Self {
            authenticator: Authenticator::new(store.clone(), hasher.clone(), config.token_ttl),
            scoper: Scoper::new(store.clone(), config.token_ttl),
            validator: Validator::new(store.clone()),
            gate: Gate::new(store.clone()),
            catalog: Catalog::new(store.clone(), hasher.clone(), config.page_limit),
            store,
            hasher,
            config,
        }
    }

    /// Spawn the background expired-token sweeper.
    #[must_use]
    pub fn spawn_sweeper(&self) -> TokenSweeper {
        TokenSweeper::spawn(self.store.clone(), self.config.sweep_interval)
    }

    // Open operations

    /// Authenticate from a raw request body.
    ///
    /// Password credentials plus a `tenantId` perform authenticate-then-
    /// scope in one shot; in that flow an unknown tenant reads as a
    /// credential mismatch, because the caller has not yet proven an
    /// identity entitled to enumerate tenants. A token plus `tenantId` is
    /// a plain scope request and keeps the `NotFound` distinction.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a malformed envelope; `Unauthorized` for unusable
    /// credentials; `NotFound` only on the token-credential scope path.
    pub async fn authenticate(&self, body: &serde_json::Value) -> Result<Access> {
        let request = AuthRequest::parse(body)?;

        match (&request.credentials, &request.tenant) {
            (credentials, None) => self.authenticator.authenticate(credentials).await,
            (credentials @ Credentials::Password { .. }, Some(tenant)) => {
                let access = self.authenticator.authenticate(credentials).await?;
                let tenant_id =
                    TenantId::from_str(tenant).map_err(|_| GateError::unauthorized())?;
                match self.scoper.scope(&access.token.id, tenant_id).await {
                    Ok(access) => Ok(access),
                    Err(GateError::NotFound { .. }) => Err(GateError::unauthorized()),
                    Err(err) => Err(err),
                }
            }
            (Credentials::Token { token }, Some(tenant)) => {
                let tenant_id = TenantId::from_str(tenant)
                    .map_err(|_| GateError::not_found("Tenant", tenant.clone()))?;
                self.scoper.scope(token, tenant_id).await
            }
        }
    }

    /// Exchange a valid token for one scoped to `tenant_id`.
    ///
    /// # Errors
    ///
    /// See [`Scoper::scope`].
    pub async fn scope(&self, token: &TokenId, tenant_id: TenantId) -> Result<Access> {
        self.scoper.scope(token, tenant_id).await
    }

    // Service operations

    /// Validate the caller's own token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is invalid.
    pub async fn validate_own(&self, token: &TokenId) -> Result<Claims> {
        self.validator.validate(token, None).await
    }

    /// Validate a token on someone's behalf.
    ///
    /// A caller may always validate their own token; validating anyone
    /// else's requires Admin. `expected_tenant` additionally pins the
    /// subject token's scope.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for insufficient privilege or an invalid subject.
    pub async fn validate_token(
        &self,
        caller: Option<&TokenId>,
        subject: &TokenId,
        expected_tenant: Option<TenantId>,
    ) -> Result<Claims> {
        if caller == Some(subject) {
            self.gate.require_service(caller).await?;
        } else {
            self.gate.require_admin(caller).await?;
        }
        self.validator.validate(subject, expected_tenant).await
    }

    /// Tenants the caller can scope into (holds at least one grant on).
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a valid token.
    pub async fn list_own_tenants(&self, token: Option<&TokenId>) -> Result<Vec<Tenant>> {
        let claims = self.gate.require_service(token).await?;
        self.catalog.tenants_for_user(claims.user_id).await
    }

    // Admin operations

    /// Revoke a token immediately.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admin callers; `NotFound` if the subject
    /// token does not exist.
    pub async fn revoke_token(&self, caller: Option<&TokenId>, subject: &TokenId) -> Result<()> {
        self.gate.require_admin(caller).await?;
        if !self.store.delete_token(&subject.hash()).await? {
            return Err(GateError::NotFound {
                resource: "Token".into(),
                id: None,
            });
        }
        tracing::info!("revoked token");
        Ok(())
    }

    /// Create a user.
    pub async fn create_user(
        &self,
        caller: Option<&TokenId>,
        name: &str,
        password: &str,
    ) -> Result<UserSummary> {
        self.gate.require_admin(caller).await?;
        self.catalog.create_user(name, password).await
    }

    /// Fetch a user.
    pub async fn get_user(&self, caller: Option<&TokenId>, id: UserId) -> Result<UserSummary> {
        self.gate.require_admin(caller).await?;
        self.catalog.get_user(id).await
    }

    /// List users.
    pub async fn list_users(
        &self,
        caller: Option<&TokenId>,
        page: Page,
    ) -> Result<Vec<UserSummary>> {
        self.gate.require_admin(caller).await?;
        self.catalog.list_users(page).await
    }

    /// Enable or disable a user.
    pub async fn set_user_enabled(
        &self,
        caller: Option<&TokenId>,
        id: UserId,
        enabled: bool,
    ) -> Result<UserSummary> {
        self.gate.require_admin(caller).await?;
        self.catalog.set_user_enabled(id, enabled).await
    }

    /// Replace a user's password.
    pub async fn set_user_password(
        &self,
        caller: Option<&TokenId>,
        id: UserId,
        password: &str,
    ) -> Result<()> {
        self.gate.require_admin(caller).await?;
        self.catalog.set_user_password(id, password).await
    }

    /// Create a tenant.
    pub async fn create_tenant(
        &self,
        caller: Option<&TokenId>,
        name: &str,
        description: &str,
    ) -> Result<Tenant> {
        self.gate.require_admin(caller).await?;
        self.catalog.create_tenant(name, description).await
    }

    /// Fetch a tenant.
    pub async fn get_tenant(&self, caller: Option<&TokenId>, id: TenantId) -> Result<Tenant> {
        self.gate.require_admin(caller).await?;
        self.catalog.get_tenant(id).await
    }

    /// List tenants.
    pub async fn list_tenants(&self, caller: Option<&TokenId>, page: Page) -> Result<Vec<Tenant>> {
        self.gate.require_admin(caller).await?;
        self.catalog.list_tenants(page).await
    }

    /// Enable or disable a tenant.
    pub async fn set_tenant_enabled(
        &self,
        caller: Option<&TokenId>,
        id: TenantId,
        enabled: bool,
    ) -> Result<Tenant> {
        self.gate.require_admin(caller).await?;
        self.catalog.set_tenant_enabled(id, enabled).await
    }

    /// Create a role.
    pub async fn create_role(&self, caller: Option<&TokenId>, name: &str) -> Result<Role> {
        self.gate.require_admin(caller).await?;
        self.catalog.create_role(name).await
    }

    /// Fetch a role.
    pub async fn get_role(&self, caller: Option<&TokenId>, id: RoleId) -> Result<Role> {
        self.gate.require_admin(caller).await?;
        self.catalog.get_role(id).await
    }

    /// List roles.
    pub async fn list_roles(&self, caller: Option<&TokenId>, page: Page) -> Result<Vec<Role>> {
        self.gate.require_admin(caller).await?;
        self.catalog.list_roles(page).await
    }

    /// Grant a role to a user, globally or on one tenant.
    pub async fn grant_role(
        &self,
        caller: Option<&TokenId>,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<()> {
        self.gate.require_admin(caller).await?;
        self.catalog.grant_role(user_id, role_id, tenant_id).await
    }

    /// Revoke a grant.
    pub async fn revoke_role(
        &self,
        caller: Option<&TokenId>,
        user_id: UserId,
        role_id: RoleId,
        tenant_id: Option<TenantId>,
    ) -> Result<()> {
        self.gate.require_admin(caller).await?;
        self.catalog.revoke_role(user_id, role_id, tenant_id).await
    }

    // Bootstrap

    /// Create the first admin account: the user, the `Admin` role if
    /// absent, and a global Admin grant. Ungated; run once at deployment
    /// before the engine serves callers.
    ///
    /// # Errors
    ///
    /// `BadRequest` if the user name is taken.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<UserSummary> {
        let role = match self.store.role_by_name(ADMIN_ROLE).await? {
            Some(role) => role,
            None => {
                let role = Role::new(ADMIN_ROLE);
                self.store.insert_role(role.clone()).await?;
                role
            }
        };

        let hash = self
            .hasher
            .hash(password)
            .map_err(|e| GateError::StoreUnavailable {
                message: format!("password hashing failed: {e}"),
            })?;
        let user = gatehouse_store::User::new(username, hash);
        let summary = UserSummary::from(&user);
        self.store.insert_user(user).await?;

        self.store
            .insert_grant(RoleGrant::new(summary.id, role.id, None))
            .await?;
        tracing::info!(user_id = %summary.id, username, "bootstrapped admin account");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_store::MemoryStore;
    use serde_json::json;

    async fn engine() -> Gatehouse {
        let store = Arc::new(MemoryStore::new());
        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        Gatehouse::with_hasher(store, GatehouseConfig::default(), hasher)
    }

    async fn admin_token(engine: &Gatehouse) -> TokenId {
        engine.bootstrap_admin("root", "rootpw").await.unwrap();
        let access = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "root", "password": "rootpw"}}
            }))
            .await
            .unwrap();
        access.token.id
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent_on_the_role_but_not_the_user() {
        let engine = engine().await;
        engine.bootstrap_admin("root", "pw").await.unwrap();
        // Second bootstrap with a new name reuses the existing Admin role.
        engine.bootstrap_admin("root2", "pw").await.unwrap();
        // Same name fails.
        assert!(engine.bootstrap_admin("root", "pw").await.is_err());
    }

    #[tokio::test]
    async fn password_plus_tenant_scopes_in_one_shot() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;

        let user = engine.create_user(Some(&admin), "alice", "pw").await.unwrap();
        let tenant = engine.create_tenant(Some(&admin), "acme", "").await.unwrap();
        let role = engine.create_role(Some(&admin), "Member").await.unwrap();
        engine
            .grant_role(Some(&admin), user.id, role.id, Some(tenant.id))
            .await
            .unwrap();

        let access = engine
            .authenticate(&json!({
                "auth": {
                    "passwordCredentials": {"username": "alice", "password": "pw"},
                    "tenantId": tenant.id.to_string()
                }
            }))
            .await
            .unwrap();
        assert_eq!(access.token.tenant.unwrap().id, tenant.id);
        assert_eq!(access.user.roles, vec!["Member".to_string()]);
    }

    #[tokio::test]
    async fn one_shot_scope_to_unknown_tenant_reads_as_unauthorized() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;
        engine.create_user(Some(&admin), "alice", "pw").await.unwrap();

        let err = engine
            .authenticate(&json!({
                "auth": {
                    "passwordCredentials": {"username": "alice", "password": "pw"},
                    "tenantId": TenantId::new().to_string()
                }
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized { .. }));

        // Unparseable tenant id on this path is also a credential mismatch.
        let err = engine
            .authenticate(&json!({
                "auth": {
                    "passwordCredentials": {"username": "alice", "password": "pw"},
                    "tenantId": "not-a-uuid"
                }
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn token_plus_tenant_keeps_the_not_found_distinction() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;

        let err = engine
            .authenticate(&json!({
                "auth": {
                    "tokenId": admin.as_str(),
                    "tenantId": TenantId::new().to_string()
                }
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound { .. }));

        let err = engine
            .authenticate(&json!({
                "auth": {"tokenId": admin.as_str(), "tenantId": "not-a-uuid"}
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound { .. }));
    }

    #[tokio::test]
    async fn service_tokens_cannot_run_admin_operations() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;
        engine.create_user(Some(&admin), "alice", "pw").await.unwrap();

        let service = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "alice", "password": "pw"}}
            }))
            .await
            .unwrap()
            .token
            .id;

        let err = engine
            .create_user(Some(&service), "bob", "pw")
            .await
            .unwrap_err();
        // 401, not 403: the taxonomy has no "forbidden".
        assert_eq!(err.http_status(), 401);

        assert!(engine.list_users(None, Page::default()).await.is_err());
    }

    #[tokio::test]
    async fn anyone_validates_their_own_token_but_only_admins_validate_others() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;
        engine.create_user(Some(&admin), "alice", "pw").await.unwrap();
        let service = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "alice", "password": "pw"}}
            }))
            .await
            .unwrap()
            .token
            .id;

        // Own token: fine.
        let claims = engine
            .validate_token(Some(&service), &service, None)
            .await
            .unwrap();
        assert_eq!(claims.username, "alice");

        // Someone else's token: admin only.
        assert!(engine
            .validate_token(Some(&service), &admin, None)
            .await
            .is_err());
        let claims = engine
            .validate_token(Some(&admin), &service, None)
            .await
            .unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn revocation_is_admin_only_and_immediate() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;
        engine.create_user(Some(&admin), "alice", "pw").await.unwrap();
        let service = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "alice", "password": "pw"}}
            }))
            .await
            .unwrap()
            .token
            .id;

        assert!(engine.revoke_token(Some(&service), &admin).await.is_err());

        engine.revoke_token(Some(&admin), &service).await.unwrap();
        assert!(engine.validate_own(&service).await.is_err());

        // Revoking again: gone.
        let err = engine.revoke_token(Some(&admin), &service).await.unwrap_err();
        assert!(matches!(err, GateError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_own_tenants_shows_only_granted_tenants() {
        let engine = engine().await;
        let admin = admin_token(&engine).await;
        let user = engine.create_user(Some(&admin), "alice", "pw").await.unwrap();
        let acme = engine.create_tenant(Some(&admin), "acme", "").await.unwrap();
        engine.create_tenant(Some(&admin), "other", "").await.unwrap();
        let role = engine.create_role(Some(&admin), "Member").await.unwrap();
        engine
            .grant_role(Some(&admin), user.id, role.id, Some(acme.id))
            .await
            .unwrap();

        let service = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "alice", "password": "pw"}}
            }))
            .await
            .unwrap()
            .token
            .id;

        let tenants = engine.list_own_tenants(Some(&service)).await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].id, acme.id);
    }

    #[tokio::test]
    async fn transient_store_outages_are_absorbed_by_the_retry_adapter() {
        use crate::testutil::FaultStore;
        use gatehouse_store::{CatalogStore, RetryPolicy, User};

        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        let config = GatehouseConfig {
            retry: RetryPolicy {
                attempts: 3,
                backoff: std::time::Duration::from_millis(1),
            },
            ..GatehouseConfig::default()
        };

        // Two injected failures fit inside three attempts.
        let store = FaultStore::new().failing_reads(2);
        store
            .inner
            .insert_user(User::new("alice", hasher.hash("pw").unwrap()))
            .await
            .unwrap();
        let engine = Gatehouse::with_hasher(Arc::new(store), config.clone(), hasher.clone());
        let body = json!({
            "auth": {"passwordCredentials": {"username": "alice", "password": "pw"}}
        });
        assert!(engine.authenticate(&body).await.is_ok());

        // With a single attempt the same outage surfaces to the caller.
        let config = GatehouseConfig {
            retry: RetryPolicy {
                attempts: 1,
                backoff: std::time::Duration::from_millis(1),
            },
            ..config
        };
        let store = FaultStore::new().failing_reads(1);
        store
            .inner
            .insert_user(User::new("bob", hasher.hash("pw").unwrap()))
            .await
            .unwrap();
        let engine = Gatehouse::with_hasher(Arc::new(store), config, hasher);
        let err = engine
            .authenticate(&json!({
                "auth": {"passwordCredentials": {"username": "bob", "password": "pw"}}
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_bad_request() {
        let engine = engine().await;
        let err = engine
            .authenticate(&json!({"credentials": {"username": "x"}}))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
