//! Normalized transfer results

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

/// Normalized result of a single transfer.
///
/// HTTP-level errors are ordinary outcomes: a 404 or 500 populates `status`
/// like any other response. Only transport-level failures (DNS, connect,
/// TLS, timeout) set the error fields, in which case `status`, `data`, and
/// `raw` are absent.
#[derive(Debug)]
pub struct Outcome {
    /// HTTP status code; absent when the transport failed before a response
    pub status: Option<u16>,
    /// JSON-decoded response body; absent when the body is empty or not JSON
    pub data: Option<serde_json::Value>,
    /// Response body verbatim; absent on transport failure
    pub raw: Option<String>,
    /// Transfer metadata, populated on every execution
    pub info: TransferInfo,
    pub(crate) error: Option<TransportError>,
}

impl Outcome {
    pub(crate) fn failed(error: TransportError, info: TransferInfo) -> Self {
        Self {
            status: None,
            data: None,
            raw: None,
            info,
            error: Some(error),
        }
    }

    /// True iff the transfer failed at the transport level.
    pub fn has_err(&self) -> bool {
        self.error.is_some()
    }

    /// Numeric code of the transport failure; `0` when a response was
    /// obtained.
    pub fn err_no(&self) -> i32 {
        self.error.as_ref().map_or(0, TransportError::code)
    }

    /// Message of the transport failure; empty when none occurred.
    pub fn err_msg(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// The transport failure itself, when one occurred.
    pub fn err(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|status| (200..300).contains(&status))
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|status| (400..500).contains(&status))
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|status| (500..600).contains(&status))
    }
}

/// Metadata captured from a single transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferInfo {
    /// URL of the final hop after redirect following; the composed request
    /// URL when the transport failed before a response
    pub effective_url: String,
    /// Final HTTP status, when a response was obtained
    pub http_code: Option<u16>,
    /// Wall time spent on the transfer
    pub elapsed: Duration,
    /// Declared Content-Length of the response
    pub content_length: Option<u64>,
    /// Declared Content-Type of the response
    pub content_type: Option<String>,
    /// Remote peer address, when known
    pub remote_addr: Option<SocketAddr>,
    /// Response headers in wire order
    pub headers: Vec<(String, String)>,
}

impl TransferInfo {
    /// Metadata for an execution that never produced a response.
    pub(crate) fn unsent(url: String, elapsed: Duration) -> Self {
        Self {
            effective_url: url,
            elapsed,
            ..Self::default()
        }
    }

    pub(crate) fn from_response(response: &reqwest::blocking::Response, elapsed: Duration) -> Self {
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            effective_url: response.url().to_string(),
            http_code: Some(response.status().as_u16()),
            elapsed,
            content_length: response.content_length(),
            content_type: response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string),
            remote_addr: response.remote_addr(),
            headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(status: u16) -> Outcome {
        Outcome {
            status: Some(status),
            data: None,
            raw: Some(String::new()),
            info: TransferInfo::default(),
            error: None,
        }
    }

    #[test]
    fn test_no_error_introspection() {
        let outcome = received(200);
        assert!(!outcome.has_err());
        assert_eq!(outcome.err_no(), 0);
        assert_eq!(outcome.err_msg(), "");
        assert!(outcome.err().is_none());
    }

    #[test]
    fn test_failed_outcome_introspection() {
        let outcome = Outcome::failed(
            TransportError::Connect("refused".to_string()),
            TransferInfo::unsent("http://localhost/".to_string(), Duration::ZERO),
        );

        assert!(outcome.has_err());
        assert_ne!(outcome.err_no(), 0);
        assert_eq!(outcome.err_msg(), "Connection error: refused");
        assert!(outcome.status.is_none());
        assert!(outcome.data.is_none());
        assert!(outcome.raw.is_none());
        assert_eq!(outcome.info.effective_url, "http://localhost/");
    }

    #[test]
    fn test_status_class_boundaries() {
        assert!(received(200).is_success());
        assert!(received(299).is_success());
        assert!(!received(300).is_success());

        assert!(received(400).is_client_error());
        assert!(received(499).is_client_error());
        assert!(!received(399).is_client_error());

        assert!(received(500).is_server_error());
        assert!(received(599).is_server_error());
        assert!(!received(499).is_server_error());
    }

    #[test]
    fn test_status_class_absent_status() {
        let outcome = Outcome::failed(
            TransportError::Timeout("deadline".to_string()),
            TransferInfo::default(),
        );
        assert!(!outcome.is_success());
        assert!(!outcome.is_client_error());
        assert!(!outcome.is_server_error());
    }
}
