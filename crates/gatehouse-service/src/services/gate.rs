//! Caller classification and privilege enforcement.

use crate::models::Claims;
use crate::services::Validator;
use gatehouse_auth::TokenId;
use gatehouse_core::{GateError, Result, ADMIN_ROLE};
use gatehouse_store::Store;
use std::sync::Arc;

/// What a presented token makes its caller.
#[derive(Debug, Clone)]
pub enum Caller {
    /// Holds a valid unscoped token backed by a global Admin grant.
    Admin(Claims),
    /// Holds any other valid token, tenant-scoped or not.
    Service(Claims),
    /// No token, or no valid one.
    Anonymous,
}

/// Classifies callers and gates operations on that classification.
///
/// Classification is recomputed on every call — there is no session state,
/// so revoking an Admin grant demotes the caller on their next request.
/// Privilege failures surface as the same `Unauthorized` as missing
/// credentials; the taxonomy deliberately never says "forbidden", to avoid
/// leaking which capabilities exist.
#[derive(Clone)]
pub struct Gate {
    validator: Validator,
}

impl Gate {
    /// Create a new gate over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            validator: Validator::new(store),
        }
    }

    /// Classify the caller by their presented token.
    ///
    /// # Errors
    ///
    /// Only `StoreUnavailable` propagates; an invalid token is a verdict
    /// (`Anonymous`), not an error.
    pub async fn classify(&self, token: Option<&TokenId>) -> Result<Caller> {
        let Some(token) = token else {
            return Ok(Caller::Anonymous);
        };

        match self.validator.validate(token, None).await {
            Ok(claims) => {
                if claims.tenant.is_none() && claims.roles.contains(ADMIN_ROLE) {
                    Ok(Caller::Admin(claims))
                } else {
                    Ok(Caller::Service(claims))
                }
            }
            Err(GateError::Unauthorized { .. }) => Ok(Caller::Anonymous),
            Err(err) => Err(err),
        }
    }

    /// Admit only Admin callers.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for everyone else.
    pub async fn require_admin(&self, token: Option<&TokenId>) -> Result<Claims> {
        match self.classify(token).await? {
            Caller::Admin(claims) => Ok(claims),
            Caller::Service(_) | Caller::Anonymous => Err(GateError::unauthorized()),
        }
    }

    /// Admit any authenticated caller (Admin or Service).
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers.
    pub async fn require_service(&self, token: Option<&TokenId>) -> Result<Claims> {
        match self.classify(token).await? {
            Caller::Admin(claims) | Caller::Service(claims) => Ok(claims),
            Caller::Anonymous => Err(GateError::unauthorized()),
        }
    }
}
