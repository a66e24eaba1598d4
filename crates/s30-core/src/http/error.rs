//! Remote error taxonomy
//!
//! Every failed pump cycle ends up as exactly one [`RemoteError`]. The
//! [`ErrorKind`] tells the caller what to do next: re-authenticate, back off
//! and retry, or give up on the payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a failed pump cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Authentication rejected (401) - re-authenticate, do not retry blindly
    Unauthorized,
    /// Remote answered with an error status - reference carries the status
    HttpProtocol,
    /// Transport-level failure (network, disconnect, malformed response)
    Communication,
    /// A 200 response whose body could not be processed
    ProcessMessage,
}

impl ErrorKind {
    /// Check if this kind of failure is worth retrying with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Communication)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unauthorized => write!(f, "Unauthorized"),
            ErrorKind::HttpProtocol => write!(f, "HTTP error"),
            ErrorKind::Communication => write!(f, "Communication error"),
            ErrorKind::ProcessMessage => write!(f, "Message processing error"),
        }
    }
}

/// A classified failure raised by the message pump
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Human-readable detail, preserving the original error text
    pub message: String,
    /// Optional numeric code, usually the HTTP status that caused it
    pub reference: Option<u16>,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            reference: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message).with_reference(401)
    }

    pub fn http_protocol(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpProtocol, message).with_reference(status)
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Communication, message)
    }

    pub fn process_message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProcessMessage, message)
    }

    /// Attach a reference code
    pub fn with_reference(mut self, reference: u16) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Whether the caller may retry after backing off.
    ///
    /// Communication failures always qualify; protocol errors only when the
    /// remote reported a server-side (5xx) status.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::HttpProtocol => matches!(self.reference, Some(500..=599)),
            kind => kind.is_retryable(),
        }
    }

    /// Whether the caller should re-establish its session before the next cycle
    pub fn requires_reauthentication(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}
