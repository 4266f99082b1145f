//! Opaque token identifiers.
//!
//! A token id is the bearer secret: 32 bytes from the OS CSPRNG, URL-safe
//! base64 encoded (43 characters). The store never holds the raw secret;
//! tokens are persisted keyed by the SHA-256 hash of the id, and the raw id
//! is returned exactly once to the caller at mint time.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Size of token secrets in bytes (256 bits of entropy).
pub const SECRET_BYTES: usize = 32;

/// An opaque, unguessable token identifier.
///
/// This is the bearer secret itself. `Debug` is redacted so the secret
/// never leaks into logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Mint a fresh random token id.
    ///
    /// Uses `OsRng` directly rather than `thread_rng()`; token minting is
    /// security critical.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap a token id presented by a caller.
    #[must_use]
    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw secret string, for returning to the caller at mint time.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The SHA-256 hash under which this token is stored.
    #[must_use]
    pub fn hash(&self) -> TokenHash {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        TokenHash(hex::encode(hasher.finalize()))
    }
}

impl std::fmt::Debug for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenId(..)")
    }
}

/// Hex-encoded SHA-256 hash of a token id — the at-rest key for tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenHash(String);

impl TokenHash {
    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against another hash.
    ///
    /// Prevents timing attacks when a presented token is checked against a
    /// stored hash outside of a keyed lookup.
    #[must_use]
    pub fn ct_eq(&self, other: &TokenHash) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::fmt::Display for TokenHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_url_safe_base64() {
        let id = TokenId::generate();
        // 32 bytes in URL-safe base64 = 43 characters, no padding.
        assert_eq!(id.as_str().len(), 43);
        assert!(!id.as_str().contains('+'));
        assert!(!id.as_str().contains('/'));
        assert!(URL_SAFE_NO_PAD.decode(id.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(TokenId::generate(), TokenId::generate());
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let id = TokenId::from_string("test-token");
        let hash = id.hash();
        assert_eq!(hash, TokenId::from_string("test-token").hash());
        // SHA-256 produces 32 bytes = 64 hex characters.
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn constant_time_comparison() {
        let a = TokenId::from_string("a").hash();
        let b = TokenId::from_string("b").hash();
        assert!(a.ct_eq(&a.clone()));
        assert!(!a.ct_eq(&b));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let id = TokenId::generate();
        assert_eq!(format!("{id:?}"), "TokenId(..)");
    }
}
