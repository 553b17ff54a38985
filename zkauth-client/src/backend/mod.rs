//! zkauth backend port.
//!
//! The backend keeps login → commitment registrations, verifies login proofs
//! and executes the token transfer on chain. Its endpoints:
//!
//! ```text
//! GET  /isUserRegistered/{login}   -> { isUserRegistered }
//! POST /register  { login, hashedPassword }                       -> { tx }
//! POST /login     { login, proof, publicSignals, recepient }      -> { tx }
//! ```

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkauth_common::Commitment;

use crate::error::ZkAuthError;

pub use http::HttpBackend;

/// Body of `POST /register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub login: String,
    pub hashed_password: Commitment,
}

/// Body of `POST /login`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login: String,
    pub proof: serde_json::Value,
    pub public_signals: Vec<String>,
    /// Spelled the way the deployed backend reads it.
    #[serde(rename = "recepient")]
    pub recipient: String,
}

/// Reply of `GET /isUserRegistered/{login}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    #[serde(default)]
    pub is_user_registered: bool,
}

/// Reply of the mutating endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub tx: Option<String>,
}

/// Requests the flows issue against the backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn is_user_registered(&self, login: &str) -> Result<bool, ZkAuthError>;

    /// Store the commitment for `login`; returns the transaction reference.
    async fn register(&self, request: &RegisterRequest) -> Result<String, ZkAuthError>;

    /// Verify the proof and transfer to the recipient; returns the transaction reference.
    async fn login(&self, request: &LoginRequest) -> Result<String, ZkAuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_request_wire_format() {
        let request = RegisterRequest {
            login: "alice".into(),
            hashed_password: "42".parse().unwrap(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "login": "alice", "hashedPassword": "42" }));
    }

    #[test]
    fn test_login_request_wire_format() {
        let request = LoginRequest {
            login: "alice".into(),
            proof: json!({ "protocol": "groth16" }),
            public_signals: vec!["2".into(), "3".into()],
            recipient: "0xabc".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["publicSignals"], json!(["2", "3"]));
        assert_eq!(value["recepient"], "0xabc");
        assert!(value.get("recipient").is_none());
    }

    #[test]
    fn test_status_defaults_to_unregistered() {
        let status: RegistrationStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.is_user_registered);
    }
}
