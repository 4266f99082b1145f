//! The gatehouse authorization engine.
//!
//! Stateless request handlers over an injected store handle: the
//! [`Authenticator`] turns credentials into unscoped tokens, the [`Scoper`]
//! binds an unscoped token to a tenant conditioned on role grants, the
//! [`Validator`] turns a token back into current claims, and the [`Gate`]
//! classifies callers and enforces admin-vs-service privilege separation.
//! [`Gatehouse`] ties the components together behind the caller-facing
//! operations a transport layer maps to routes.
//!
//! No component retains state between calls; the store is the single point
//! of serialization.

pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod testutil;

pub use config::{ConfigError, GatehouseConfig};
pub use engine::Gatehouse;
pub use logging::init_logging;
pub use models::{Access, AuthRequest, Claims, Credentials, Page, TenantRef, UserSummary};
pub use services::{Authenticator, Caller, Catalog, Gate, Scoper, TokenSweeper, Validator};
