//! Authentication request parsing.
//!
//! Protocol-agnostic equivalent of the wire behavior: the body must carry
//! an `auth` envelope holding either `passwordCredentials` or a `tokenId`,
//! optionally with a `tenantId` to request a scoped token in one shot.
//!
//! The error split is deliberate and load-bearing:
//! - a missing or wrong-shaped envelope is a malformed *request* →
//!   [`GateError::BadRequest`];
//! - an envelope whose credential fields are null, missing, or empty is a
//!   credential mismatch → [`GateError::Unauthorized`], indistinguishable
//!   from a wrong password.

use gatehouse_auth::TokenId;
use gatehouse_core::{GateError, Result};
use serde_json::{Map, Value};

/// Parsed caller credentials.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username and password.
    Password {
        /// The user's unique login name.
        username: String,
        /// The plaintext password.
        password: String,
    },
    /// An existing token presented for re-authentication or scoping.
    Token {
        /// The opaque token id.
        token: TokenId,
    },
}

/// A parsed authentication request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// How the caller identifies itself.
    pub credentials: Credentials,
    /// Raw tenant id string when the caller asked for a scoped token.
    /// Resolution (and the 401-vs-404 distinction) happens in the engine.
    pub tenant: Option<String>,
}

impl AuthRequest {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a malformed envelope, `Unauthorized` for a
    /// well-shaped envelope with unusable credential fields.
    pub fn parse(body: &Value) -> Result<Self> {
        let auth = body
            .as_object()
            .and_then(|o| o.get("auth"))
            .and_then(Value::as_object)
            .ok_or_else(|| GateError::bad_request("expected a top-level \"auth\" object"))?;

        let tenant = match auth.get("tenantId") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                v.as_str()
                    .ok_or_else(|| GateError::bad_request("\"tenantId\" must be a string"))?
                    .to_string(),
            ),
        };

        let credentials = if let Some(pc) = auth.get("passwordCredentials") {
            let pc = pc
                .as_object()
                .ok_or_else(|| GateError::bad_request("\"passwordCredentials\" must be an object"))?;
            Credentials::Password {
                username: credential_field(pc, "username")?,
                password: credential_field(pc, "password")?,
            }
        } else if let Some(token) = auth.get("tokenId") {
            let token = token
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(GateError::unauthorized)?;
            Credentials::Token {
                token: TokenId::from_string(token),
            }
        } else {
            return Err(GateError::bad_request(
                "expected \"passwordCredentials\" or \"tokenId\" under \"auth\"",
            ));
        };

        Ok(Self {
            credentials,
            tenant,
        })
    }
}

/// A credential field that is missing, null, non-string, or empty is a
/// mismatch, not a shape error.
fn credential_field(obj: &Map<String, Value>, key: &str) -> Result<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(GateError::unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_password_credentials() {
        let body = json!({
            "auth": {"passwordCredentials": {"username": "alice", "password": "hunter2"}}
        });
        let request = AuthRequest::parse(&body).unwrap();
        assert!(request.tenant.is_none());
        let Credentials::Password { username, password } = request.credentials else {
            panic!("expected password credentials");
        };
        assert_eq!(username, "alice");
        assert_eq!(password, "hunter2");
    }

    #[test]
    fn parses_token_with_tenant() {
        let body = json!({"auth": {"tokenId": "abc123", "tenantId": "t-1"}});
        let request = AuthRequest::parse(&body).unwrap();
        assert_eq!(request.tenant.as_deref(), Some("t-1"));
        assert!(matches!(request.credentials, Credentials::Token { .. }));
    }

    #[test]
    fn missing_envelope_is_bad_request() {
        let body = json!({
            "this-is-completely-wrong": {"username": "alice", "password": "x"}
        });
        let err = AuthRequest::parse(&body).unwrap_err();
        assert!(matches!(err, GateError::BadRequest { .. }));
    }

    #[test]
    fn envelope_without_credentials_is_bad_request() {
        let err = AuthRequest::parse(&json!({"auth": {}})).unwrap_err();
        assert!(matches!(err, GateError::BadRequest { .. }));
    }

    #[test]
    fn null_username_is_unauthorized_not_bad_request() {
        let body = json!({
            "auth": {"passwordCredentials": {"username": null, "password": "x"}}
        });
        let err = AuthRequest::parse(&body).unwrap_err();
        assert!(matches!(err, GateError::Unauthorized { .. }));
    }

    #[test]
    fn missing_password_is_unauthorized() {
        let body = json!({"auth": {"passwordCredentials": {"username": "alice"}}});
        let err = AuthRequest::parse(&body).unwrap_err();
        assert!(matches!(err, GateError::Unauthorized { .. }));
    }

    #[test]
    fn empty_token_id_is_unauthorized() {
        let err = AuthRequest::parse(&json!({"auth": {"tokenId": ""}})).unwrap_err();
        assert!(matches!(err, GateError::Unauthorized { .. }));
    }
}
