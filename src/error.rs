//! Error taxonomy shared by every stage of the request pipeline.
//!
//! The variants keep "the server could not be reached" ([`Error::Network`])
//! apart from "the server answered with a failure" ([`Error::Transport`]) and
//! "the server answered but the payload was unusable" ([`Error::Decode`]).

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::decode::EndpointKind;

/// Longest message a [`TransportFailure`] carries before truncation.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Errors produced while composing, fetching or decoding a request.
#[derive(Debug, Error)]
pub enum Error {
    /// The base endpoint (or another piece of configuration) is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// No response was obtained (DNS, refused connection, timeout expiry)
    #[error("request to {target} failed: {source}")]
    Network {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response was obtained but its status is outside 200..300
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    /// The response body does not match the expected JSON shape
    #[error("decode {kind} response: {message} (near: {excerpt})")]
    Decode {
        kind: EndpointKind,
        message: String,
        excerpt: String,
    },
}

impl Error {
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Status code of a non-success response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(failure) => Some(failure.status),
            _ => None,
        }
    }
}

/// A non-success HTTP response, summarized for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: u16,
    pub message: String,
}

impl TransportFailure {
    /// Builds a failure from the raw status and body.
    ///
    /// The message is the trimmed body, or the status' reason phrase when the
    /// body is blank, capped at [`MAX_MESSAGE_CHARS`] with a `...` suffix.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();
        let message = if trimmed.is_empty() {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("")
                .to_string()
        } else {
            trimmed.to_string()
        };

        Self {
            status,
            message: summarize(&message, MAX_MESSAGE_CHARS),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request failed: {} {}", self.status, self.message)
    }
}

impl std::error::Error for TransportFailure {}

/// Caps `msg` at `max` characters, appending `...` when anything was cut.
pub(crate) fn summarize(msg: &str, max: usize) -> String {
    match msg.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &msg[..cut]),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_uses_trimmed_body() {
        let failure = TransportFailure::from_response(404, b"  {\"error\":\"not found\"}\n");
        assert_eq!(failure.status, 404);
        assert_eq!(failure.message, r#"{"error":"not found"}"#);
        assert_eq!(
            failure.to_string(),
            r#"request failed: 404 {"error":"not found"}"#
        );
    }

    #[test]
    fn test_failure_empty_body_uses_reason_phrase() {
        let failure = TransportFailure::from_response(503, b"   ");
        assert_eq!(failure.message, "Service Unavailable");
    }

    #[test]
    fn test_failure_unknown_status_with_empty_body() {
        let failure = TransportFailure::from_response(599, b"");
        assert_eq!(failure.message, "");
        assert_eq!(failure.to_string(), "request failed: 599 ");
    }

    #[test]
    fn test_failure_truncates_long_body() {
        let body = "x".repeat(250);
        let failure = TransportFailure::from_response(500, body.as_bytes());
        assert_eq!(failure.message.len(), MAX_MESSAGE_CHARS + 3);
        assert!(failure.message.ends_with("..."));
    }

    #[test]
    fn test_summarize_respects_char_boundaries() {
        let msg = "ä".repeat(5);
        assert_eq!(summarize(&msg, 3), "äää...");
        assert_eq!(summarize(&msg, 5), msg);
        assert_eq!(summarize("", 3), "");
    }

    #[test]
    fn test_error_helpers() {
        let err = Error::from(TransportFailure::from_response(404, b"gone"));
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_network());
        assert!(!err.is_decode());

        let err = Error::Decode {
            kind: EndpointKind::Locations,
            message: "expected value".into(),
            excerpt: "nope".into(),
        };
        assert!(err.is_decode());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("locations"));

        let err = Error::Config("base URL is required".into());
        assert_eq!(err.to_string(), "configuration error: base URL is required");
    }
}
