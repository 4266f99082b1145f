//! Credential authentication: credentials in, unscoped token out.

use crate::models::{Access, Credentials};
use crate::services::support::{build_access, mint_token};
use chrono::Utc;
use gatehouse_auth::PasswordHasher;
use gatehouse_core::{GateError, Result};
use gatehouse_store::{Store, User};
use std::sync::Arc;

/// Validates credentials against the credential store and mints unscoped
/// tokens. Stateless; holds only the injected store handle and
/// configuration.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    token_ttl: chrono::Duration,
}

impl Authenticator {
    /// Create a new authenticator.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, token_ttl: chrono::Duration) -> Self {
        Self {
            store,
            hasher,
            token_ttl,
        }
    }

    /// Authenticate and mint a fresh unscoped token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an unknown user, a disabled user, a password
    /// mismatch, or an invalid re-authentication token — identical in all
    /// cases, so a caller cannot probe which accounts exist.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Access> {
        let user = match credentials {
            Credentials::Password { username, password } => {
                self.check_password(username, password).await?
            }
            Credentials::Token { token } => {
                let record = self
                    .store
                    .token_by_hash(&token.hash())
                    .await?
                    .filter(|t| !t.is_expired(Utc::now()))
                    .ok_or_else(GateError::unauthorized)?;
                self.store
                    .user_by_id(record.user_id)
                    .await?
                    .filter(|u| u.enabled)
                    .ok_or_else(GateError::unauthorized)?
            }
        };

        let (token_id, record) = mint_token(self.store.as_ref(), user.id, None, self.token_ttl).await?;
        tracing::info!(user_id = %user.id, "issued unscoped token");

        build_access(self.store.as_ref(), &user, token_id, &record, None).await
    }

    async fn check_password(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .store
            .user_by_name(username)
            .await?
            .ok_or_else(GateError::unauthorized)?;

        if !user.enabled {
            return Err(GateError::unauthorized());
        }

        // A hash that fails to parse verifies as a mismatch; corrupt
        // credential rows must not read differently from a wrong password.
        let matches = self
            .hasher
            .verify(password, &user.password_hash)
            .unwrap_or(false);
        if !matches {
            return Err(GateError::unauthorized());
        }

        Ok(user)
    }
}
