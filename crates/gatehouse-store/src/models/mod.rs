//! Entity models owned by the store.

mod role;
mod role_grant;
mod tenant;
mod token;
mod user;

pub use role::Role;
pub use role_grant::RoleGrant;
pub use tenant::Tenant;
pub use token::Token;
pub use user::User;
