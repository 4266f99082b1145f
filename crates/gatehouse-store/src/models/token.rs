//! Token entity model.

use chrono::{DateTime, Duration, Utc};
use gatehouse_auth::TokenHash;
use gatehouse_core::{TenantId, UserId};

/// An issued token record.
///
/// Stored keyed by the SHA-256 hash of the opaque token id; the raw secret
/// is only ever transmitted to the caller at mint time. Tokens are
/// immutable once issued: (re)scoping mints a new token rather than editing
/// in place, and a token disappears only by explicit revoke or expiry.
#[derive(Debug, Clone)]
pub struct Token {
    /// SHA-256 hash of the opaque token id.
    pub hash: TokenHash,

    /// The user this token authenticates.
    pub user_id: UserId,

    /// The tenant this token is scoped to, or `None` for an unscoped token.
    pub tenant_id: Option<TenantId>,

    /// When the token was minted.
    pub issued_at: DateTime<Utc>,

    /// When the token stops being valid. Always after `issued_at`.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Mint a token record expiring `ttl` from now.
    ///
    /// # Panics
    ///
    /// Panics if `ttl` is not positive; the expiry invariant
    /// (`expires_at > issued_at`) is enforced at mint.
    #[must_use]
    pub fn mint(hash: TokenHash, user_id: UserId, tenant_id: Option<TenantId>, ttl: Duration) -> Self {
        assert!(ttl > Duration::zero(), "token TTL must be positive");
        let issued_at = Utc::now();
        Self {
            hash,
            user_id,
            tenant_id,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Whether the token is past its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the token is scoped to a tenant.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.tenant_id.is_some()
    }
}
