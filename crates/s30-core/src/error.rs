//! Error types for the S30 core library
//!
//! Construction-time failures (bad endpoint, bad timeouts, HTTP client setup)
//! are reported through [`Error`]. Failures of a pump cycle itself are
//! [`RemoteError`]s, which convert into [`Error::Remote`] when a caller wants a
//! single error type.

use thiserror::Error;

use crate::http::RemoteError;

/// Main error type for S30 core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Retrieve endpoint could not be turned into a URL
    #[error("Invalid endpoint: {message}")]
    Endpoint {
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// HTTP client construction errors
    #[error("HTTP client error: {message}")]
    HttpClient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A classified failure of a pump cycle
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::configuration("app id is empty");
        assert_eq!(err.to_string(), "Configuration error: app id is empty");
    }

    #[test]
    fn test_remote_error_is_transparent() {
        let remote = RemoteError::new(ErrorKind::HttpProtocol, "Bad Gateway").with_reference(502);
        let err: Error = remote.clone().into();
        assert_eq!(err.to_string(), remote.to_string());
        assert!(matches!(err, Error::Remote(ref e) if e.reference == Some(502)));
    }
}
