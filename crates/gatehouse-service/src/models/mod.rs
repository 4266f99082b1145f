//! Request and response shapes for the caller-facing operations.

mod access;
mod page;
mod requests;

pub use access::{Access, Claims, TenantRef, TokenInfo, UserInfo, UserSummary};
pub use page::Page;
pub use requests::{AuthRequest, Credentials};
