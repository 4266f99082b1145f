//! Credential primitives for gatehouse.
//!
//! This crate provides:
//! - Argon2id password hashing with OWASP-recommended parameters
//! - Opaque token secret generation (256 bits from the OS CSPRNG)
//! - SHA-256 at-rest token hashing with constant-time verification

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use token::{TokenHash, TokenId, SECRET_BYTES};
