//! Support backend error types

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single call to the support backend.
///
/// None of these are shown to the user; they collapse into one fallback
/// message and are only logged.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout, or a broken body stream
    #[error("request to support backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("support backend returned {status}")]
    Status { status: StatusCode },

    /// The body was not the JSON object we expected
    #[error("malformed response from support backend: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Short label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(e) if e.is_timeout() => "timeout",
            GatewayError::Transport(_) => "transport",
            GatewayError::Status { .. } => "status",
            GatewayError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_kind_and_message() {
        let err = GatewayError::Status {
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(err.kind(), "status");
        assert_eq!(err.to_string(), "support backend returned 502 Bad Gateway");
    }

    #[test]
    fn test_decode_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: GatewayError = serde_err.into();
        assert_eq!(err.kind(), "decode");
        assert!(err.to_string().starts_with("malformed response"));
    }
}
