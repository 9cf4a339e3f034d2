use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error envelope for non-2xx responses from the minitest API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct APIError {
    pub status: u16,
    pub message: String,
    /// Raw response body for debugging (when available).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

impl APIError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            raw_body: None,
        }
    }

    pub(crate) fn from_body(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("http {status}")
        } else {
            body.trim().chars().take(200).collect()
        };
        Self {
            status,
            message,
            raw_body: (!body.is_empty()).then_some(body),
        }
    }
}

impl fmt::Display for APIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for APIError {}

/// Convenience alias for fallible results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Transport-level error (timeouts, DNS/TLS/connectivity).
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub source: Option<reqwest::Error>,
}

/// Broad transport error kinds for classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "transport",
        };
        write!(f, "{label}")
    }
}

/// Unified error type surfaced by the crate.
///
/// Each workflow stage fails with its own variant; the orchestrator is the
/// only place that turns one of these into a host-visible failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration input.
    #[error("{0}")]
    Config(String),

    /// Plan creation was accepted on the wire but did not yield a plan id.
    #[error("{0}")]
    Submit(String),

    /// Status query failed or reported a terminal failure code.
    #[error("{0}")]
    Poll(String),

    /// Report retrieval did not yield a download link.
    #[error("{0}")]
    Report(String),

    #[error("{0}")]
    Api(#[from] APIError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
