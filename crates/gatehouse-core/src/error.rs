//! The unified error taxonomy.
//!
//! Every caller-facing operation terminates with one of four errors. A
//! transport layer outside this core maps them to status codes via
//! [`GateError::http_status`].
//!
//! `Unauthorized` deliberately covers bad credentials, expired tokens, and
//! insufficient privilege alike: the caller cannot distinguish "unknown
//! user" from "wrong password" from "not an admin". This is an
//! anti-enumeration contract, not an omission.

use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout gatehouse.
pub type Result<T> = std::result::Result<T, GateError>;

/// Terminal error for a gatehouse operation.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateError {
    /// Bad, missing, or expired credentials or token, or insufficient
    /// privilege. Maps to HTTP 401.
    #[error("Unauthorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        /// Optional context for logs; never exposes which check failed
        /// to distinguish credential classes.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A referenced tenant, user, or role does not exist (or is disabled,
    /// where disabled is externally indistinguishable from absent).
    /// Maps to HTTP 404.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource (e.g., "Tenant", "Role").
        resource: String,
        /// Optional identifier of the resource.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Malformed input shape, e.g. a missing expected top-level field.
    /// Maps to HTTP 400.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Description of what was malformed.
        message: String,
    },

    /// Storage I/O failure. The only transient error in the taxonomy; the
    /// caller's transport layer may retry the whole call with backoff.
    /// Maps to HTTP 503.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the storage failure.
        message: String,
    },
}

impl GateError {
    /// An `Unauthorized` with no detail — the common case.
    #[must_use]
    pub fn unauthorized() -> Self {
        GateError::Unauthorized { message: None }
    }

    /// A `NotFound` for the given resource type and id.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        GateError::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// A `BadRequest` with the given message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        GateError::BadRequest {
            message: message.into(),
        }
    }

    /// The HTTP status a transport layer should use for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            GateError::Unauthorized { .. } => 401,
            GateError::NotFound { .. } => 404,
            GateError::BadRequest { .. } => 400,
            GateError::StoreUnavailable { .. } => 503,
        }
    }
}
