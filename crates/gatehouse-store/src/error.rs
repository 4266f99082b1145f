//! Error types for the storage interface.

use gatehouse_core::GateError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out. The only transient
    /// variant; safe to retry for idempotent operations.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An insert-if-absent hit an existing row (duplicate id, unique name,
    /// or grant triple).
    #[error("{resource} already exists")]
    Conflict {
        /// The resource whose uniqueness constraint was violated.
        resource: &'static str,
    },
}

impl StoreError {
    /// Whether a retry of the same operation could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<StoreError> for GateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => GateError::StoreUnavailable { message },
            StoreError::Conflict { resource } => {
                GateError::bad_request(format!("{resource} already exists"))
            }
        }
    }
}
