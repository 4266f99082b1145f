//! Data model and storage interface for gatehouse.
//!
//! The engine treats durable storage as an abstract collaborator: the
//! [`CatalogStore`] and [`TokenStore`] traits define everything the auth
//! core needs, [`MemoryStore`] provides an in-process implementation, and
//! [`RetryingStore`] composes bounded retries over any store once at
//! construction time.

pub mod error;
pub mod memory;
pub mod models;
pub mod retry;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use retry::{RetryPolicy, RetryingStore};
pub use store::{CatalogStore, PageQuery, Store, TokenStore};

pub use models::{Role, RoleGrant, Tenant, Token, User};
