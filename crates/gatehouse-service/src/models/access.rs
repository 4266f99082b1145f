//! Response shapes: the access document and validated claims.

use chrono::{DateTime, Utc};
use gatehouse_auth::TokenId;
use gatehouse_core::{TenantId, UserId};
use serde::Serialize;
use std::collections::BTreeSet;

/// A tenant reference embedded in tokens and claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantRef {
    /// The tenant's id.
    pub id: TenantId,
    /// The tenant's unique name.
    pub name: String,
}

/// The token section of an access document.
///
/// This is the only place the raw token id ever appears; it is handed to
/// the caller once at mint time.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    /// The opaque token id (the bearer secret).
    pub id: TokenId,
    /// When the token expires.
    pub expires: DateTime<Utc>,
    /// The tenant the token is scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantRef>,
}

/// The user section of an access document.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// The user's id.
    pub id: UserId,
    /// The user's login name.
    pub username: String,
    /// Role names in effect for the token's scope, sorted.
    pub roles: Vec<String>,
}

/// The document returned by authenticate and scope operations.
#[derive(Debug, Clone, Serialize)]
pub struct Access {
    /// The freshly minted token.
    pub token: TokenInfo,
    /// The authenticated identity.
    pub user: UserInfo,
}

/// Validated identity/role/tenant facts for a token.
///
/// Roles are computed fresh from current grants at validation time, never
/// cached in the token: revoking a grant takes effect on the next
/// validation even though the token id itself stays live.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    /// The token owner's id.
    pub user_id: UserId,
    /// The token owner's login name.
    pub username: String,
    /// The token's tenant scope, if any.
    pub tenant: Option<TenantRef>,
    /// Current role names for the resolved scope.
    pub roles: BTreeSet<String>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// A user as returned by admin operations. Never carries the password
/// hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// The user's id.
    pub id: UserId,
    /// The user's login name.
    pub name: String,
    /// Whether the account may authenticate.
    pub enabled: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl From<&gatehouse_store::User> for UserSummary {
    fn from(user: &gatehouse_store::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}
