//! Gatehouse core library.
//!
//! Shared types for the gatehouse authorization engine.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `TenantId`, `RoleId`)
//! - [`error`] - The unified error taxonomy (`GateError`)

pub mod error;
pub mod ids;

pub use error::{GateError, Result};
pub use ids::{ParseIdError, RoleId, TenantId, UserId};

/// The distinguished management role.
///
/// Holding a global grant of this role authorizes admin operations
/// (user/tenant/role management, arbitrary token validation). It is
/// deliberately excluded from tenant-scoping eligibility: an Admin-only
/// grant on a tenant does not make the user a member of that tenant.
pub const ADMIN_ROLE: &str = "Admin";
