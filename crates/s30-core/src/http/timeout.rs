//! Timeout configuration for the retrieve transport
//!
//! The retrieve call is a long poll: the remote holds the request open for up
//! to the long-polling window before answering, so the request timeout has to
//! outlast that window.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Extra time granted on top of the long-polling window
pub const LONG_POLL_MARGIN: Duration = Duration::from_secs(15);

/// Timeout configuration for HTTP requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout - time to establish a connection
    pub connect_timeout: Duration,
    /// Request timeout - total time for the entire request
    pub request_timeout: Duration,
    /// How long idle pooled connections are kept for reuse
    pub keepalive_timeout: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            keepalive_timeout: Some(Duration::from_secs(90)),
        }
    }
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn new(
        connect_timeout: Duration,
        request_timeout: Duration,
        keepalive_timeout: Option<Duration>,
    ) -> Self {
        Self {
            connect_timeout,
            request_timeout,
            keepalive_timeout,
        }
    }

    /// Timeouts sized for a given long-polling window
    pub fn for_long_poll(window: Duration) -> Self {
        Self {
            request_timeout: window + LONG_POLL_MARGIN,
            ..Self::default()
        }
    }

    /// Override the request timeout
    pub fn with_request_timeout(&self, timeout: Duration) -> Self {
        let mut config = self.clone();
        config.request_timeout = timeout;
        config
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout.is_zero() {
            return Err("Connect timeout cannot be zero".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        if self.request_timeout < self.connect_timeout {
            return Err("Request timeout should be >= connect timeout".to_string());
        }

        Ok(())
    }

    /// Validate against the long-polling window the remote will hold requests for
    pub fn validate_for_long_poll(&self, window: Duration) -> Result<(), String> {
        self.validate()?;

        if self.request_timeout <= window {
            return Err(format!(
                "Request timeout ({:?}) must exceed the long-polling window ({:?})",
                self.request_timeout, window
            ));
        }

        Ok(())
    }
}
