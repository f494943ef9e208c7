//! Transport error types

use thiserror::Error;

/// Transport-level failures: anything that prevents an HTTP response from
/// being obtained, plus local serialization and client-construction faults.
///
/// HTTP status codes are never errors at this layer; a 404 or 500 comes back
/// as a normal [`Outcome`](crate::Outcome) carrying that status.
///
/// Every variant maps to a stable non-zero code via [`TransportError::code`].
/// Code `0` is reserved for "no error" and is never produced.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS resolution or TCP/TLS connection failure
    #[error("Connection error: {0}")]
    Connect(String),
    /// Connect timeout exceeded
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Redirect limit exceeded or redirect loop detected
    #[error("Redirect error: {0}")]
    Redirect(String),
    /// Response body could not be read
    #[error("Body error: {0}")]
    Body(String),
    /// Request body could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Transport handle could not be constructed
    #[error("Client build error: {0}")]
    Build(String),
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Stable numeric code for the failure, in `1..=7`.
    pub fn code(&self) -> i32 {
        match self {
            TransportError::Connect(_) => 1,
            TransportError::Timeout(_) => 2,
            TransportError::Redirect(_) => 3,
            TransportError::Body(_) => 4,
            TransportError::Serialization(_) => 5,
            TransportError::Build(_) => 6,
            TransportError::Other(_) => 7,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_redirect() {
            TransportError::Redirect(err.to_string())
        } else if err.is_builder() {
            TransportError::Build(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_display() {
        let error = TransportError::Connect("connection refused".to_string());
        assert_eq!(format!("{}", error), "Connection error: connection refused");
    }

    #[test]
    fn test_timeout_display() {
        let error = TransportError::Timeout("deadline elapsed".to_string());
        assert_eq!(format!("{}", error), "Request timeout: deadline elapsed");
    }

    #[test]
    fn test_serialization_display() {
        let error = TransportError::Serialization("invalid JSON".to_string());
        assert_eq!(format!("{}", error), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_other_display() {
        let error = TransportError::Other("unknown error".to_string());
        assert_eq!(format!("{}", error), "unknown error");
    }

    #[test]
    fn test_codes_are_distinct_and_nonzero() {
        let errors = [
            TransportError::Connect(String::new()),
            TransportError::Timeout(String::new()),
            TransportError::Redirect(String::new()),
            TransportError::Body(String::new()),
            TransportError::Serialization(String::new()),
            TransportError::Build(String::new()),
            TransportError::Other(String::new()),
        ];

        let mut seen = Vec::new();
        for error in &errors {
            let code = error.code();
            assert_ne!(code, 0);
            assert!(!seen.contains(&code), "duplicate code {}", code);
            seen.push(code);
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("not valid json");
        let json_error = result.expect_err("Invalid JSON should produce an error");
        let error: TransportError = json_error.into();

        match error {
            TransportError::Serialization(msg) => {
                assert!(
                    msg.contains("expected"),
                    "Error message should describe JSON error"
                );
            }
            _ => panic!("Expected TransportError::Serialization"),
        }
    }
}
