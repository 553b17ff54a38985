//! Error types for zkauth flows and the backend failure interpretation chain.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use zkauth_common::EncodingError;
use zkauth_prover::ProverError;

/// Where a timeout fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    RegistrationCheck,
    Registration,
    ProofGeneration,
    Transfer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RegistrationCheck => "registration check",
            Stage::Registration => "registration",
            Stage::ProofGeneration => "proof generation",
            Stage::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// Errors that end a registration or transfer flow.
#[derive(Debug, Error)]
pub enum ZkAuthError {
    /// Missing or malformed input, detected before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("login {login:?} is already registered")]
    AlreadyRegistered { login: String },

    /// Structured failure payload returned by the backend.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Transport failure or unstructured error body.
    #[error("transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    #[error("proof engine error: {0}")]
    ProofEngine(#[from] ProverError),

    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<EncodingError> for ZkAuthError {
    fn from(err: EncodingError) -> Self {
        match err {
            EncodingError::Empty => ZkAuthError::Validation(MISSING_FIELDS.to_string()),
            EncodingError::TooLong { max, .. } => {
                ZkAuthError::Validation(format!("Password must be at most {} characters.", max))
            }
            other => ZkAuthError::Validation(other.to_string()),
        }
    }
}

impl ZkAuthError {
    /// Message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            ZkAuthError::Validation(message) => message.clone(),
            ZkAuthError::AlreadyRegistered { .. } => "User already registered.".to_string(),
            ZkAuthError::Backend { message } | ZkAuthError::Transport { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// Whether the error came back from the backend round-trip.
    pub fn is_backend_response(&self) -> bool {
        matches!(
            self,
            ZkAuthError::Backend { .. } | ZkAuthError::Transport { .. }
        )
    }
}

pub(crate) const MISSING_FIELDS: &str = "Please fill in both login and password fields.";

// ═══════════════════════════════════════════════════════════════════════════════
// FAILURE INTERPRETATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Error payload shapes the backend is known to return.
#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

/// `error` or `message` field of a JSON object body.
pub fn structured_message(body: &str) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_str(body).ok()?;
    payload
        .error
        .or(payload.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Text after the first `"` up to the next one, verbatim, or to the end of
/// the body when the quote is never closed.
pub fn quoted_fragment(body: &str) -> Option<String> {
    let start = body.find('"')? + 1;
    let rest = &body[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    let fragment = &rest[..end];
    if fragment.is_empty() {
        None
    } else {
        Some(fragment.to_string())
    }
}

/// Readable message for an error body: structured field, then quoted
/// fragment, then the raw body unchanged.
pub fn extract_error_message(body: &str) -> String {
    structured_message(body)
        .or_else(|| quoted_fragment(body))
        .unwrap_or_else(|| body.to_string())
}

/// Classify a failed backend response.
///
/// A structured payload is a [`ZkAuthError::Backend`]; anything else is a
/// [`ZkAuthError::Transport`] carrying the best fragment of the body, or
/// `fallback` when the body is blank.
pub fn interpret_failure(status: Option<u16>, body: &str, fallback: &str) -> ZkAuthError {
    if let Some(message) = structured_message(body) {
        return ZkAuthError::Backend { message };
    }

    let message = if body.trim().is_empty() {
        fallback.to_string()
    } else {
        quoted_fragment(body).unwrap_or_else(|| body.to_string())
    };

    ZkAuthError::Transport { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_body_yields_fragment() {
        assert_eq!(
            extract_error_message(r#"Error: "insufficient funds""#),
            "insufficient funds"
        );
    }

    #[test]
    fn test_unquoted_body_is_unchanged() {
        assert_eq!(
            extract_error_message("internal server error"),
            "internal server error"
        );
    }

    #[test]
    fn test_structured_field_wins_over_quotes() {
        assert_eq!(
            extract_error_message(r#"{"error":"invalid proof"}"#),
            "invalid proof"
        );
        assert_eq!(
            extract_error_message(r#"{"message":"user not found"}"#),
            "user not found"
        );
    }

    #[test]
    fn test_unclosed_quote_takes_the_rest() {
        assert_eq!(
            extract_error_message(r#"Error: "execution reverted"#),
            "execution reverted"
        );
    }

    #[test]
    fn test_quoted_fragment_is_verbatim() {
        assert_eq!(
            extract_error_message("Error: \" insufficient funds \""),
            " insufficient funds "
        );
    }

    #[test]
    fn test_empty_quotes_fall_back_to_body() {
        assert_eq!(extract_error_message(r#"Error: """#), r#"Error: """#);
    }

    #[test]
    fn test_interpret_failure_classifies() {
        match interpret_failure(Some(400), r#"{"error":"bad proof"}"#, "login failed.") {
            ZkAuthError::Backend { message } => assert_eq!(message, "bad proof"),
            other => panic!("unexpected {other:?}"),
        }

        match interpret_failure(Some(500), r#"Error: "nonce too low""#, "login failed.") {
            ZkAuthError::Transport { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "nonce too low");
            }
            other => panic!("unexpected {other:?}"),
        }

        match interpret_failure(Some(502), "  ", "login failed.") {
            ZkAuthError::Transport { message, .. } => assert_eq!(message, "login failed."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_encoding_errors_become_validation() {
        let err: ZkAuthError = EncodingError::Empty.into();
        assert_eq!(err.user_message(), MISSING_FIELDS);

        let err: ZkAuthError = EncodingError::TooLong { max: 10, actual: 12 }.into();
        assert_eq!(err.user_message(), "Password must be at most 10 characters.");
    }

    #[test]
    fn test_transport_display_includes_status() {
        let err = ZkAuthError::Transport {
            status: Some(503),
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "transport error (HTTP 503): unavailable");
    }
}
