//! Error types for credential primitives.

use thiserror::Error;

/// Errors from password hashing and verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Hashing failed (invalid parameters or internal failure).
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored hash is not a valid PHC string.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}
