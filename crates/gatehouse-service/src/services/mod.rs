//! The engine's components.

mod authenticator;
mod catalog;
mod gate;
mod scoper;
mod support;
mod sweeper;
mod validator;

pub use authenticator::Authenticator;
pub use catalog::Catalog;
pub use gate::{Caller, Gate};
pub use scoper::Scoper;
pub use sweeper::TokenSweeper;
pub use validator::Validator;
