//! Transport capability used by the message pump
//!
//! The pump never touches an HTTP library directly. It issues one GET through
//! a [`Transport`] and classifies whatever comes back: a [`TransportResponse`]
//! or one of the closed set of [`TransportError`]s.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Numeric HTTP status
    pub status: u16,
    /// Value of the Content-Length header, if the remote sent one
    pub content_length: Option<u64>,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status,
            content_length: Some(body.len() as u64),
            body,
        }
    }

    /// A response with no body, e.g. 204
    pub fn empty(status: u16) -> Self {
        Self::new(status, String::new())
    }
}

/// Everything that can go wrong below the HTTP status line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote answered but the response could not be read or was malformed
    #[error("{message}")]
    Response {
        status: Option<u16>,
        message: String,
    },

    /// The remote closed the connection before a response arrived
    #[error("Server disconnected")]
    ServerDisconnected,

    /// No connection could be established
    #[error("Cannot connect to host {host}:{port} [{message}]")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    /// The request did not complete in time
    #[error("Request timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },
}

/// Capability to issue the retrieve request
///
/// Implementations acquire whatever connection they need per call and must
/// release it on every exit path before the future resolves.
pub trait Transport {
    fn get(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
