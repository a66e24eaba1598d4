//! reqwest-backed transport for the retrieve endpoint
//!
//! Maps `reqwest::Error` onto the closed [`TransportError`] set so the pump
//! only ever sees outcomes it knows how to classify.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{RetrieveEndpoint, TimeoutConfig, Transport, TransportError, TransportResponse};
use crate::{Error, Result};

/// Text hyper uses when the peer hangs up before a response was complete
const INCOMPLETE_MESSAGE: &str = "connection closed before message completed";

/// Configuration for the reqwest transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where to retrieve messages from
    pub endpoint: RetrieveEndpoint,
    /// Connection and request timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Whether to validate TLS certificates
    #[serde(default = "default_validate_tls")]
    pub validate_tls: bool,
}

fn default_validate_tls() -> bool {
    true
}

impl ClientConfig {
    /// Configuration with timeouts sized to the endpoint's long-polling window
    pub fn new(endpoint: RetrieveEndpoint) -> Self {
        let timeouts = TimeoutConfig::for_long_poll(endpoint.long_polling_window());
        Self {
            endpoint,
            timeouts,
            validate_tls: true,
        }
    }

    /// Controller on the local network. These serve self-signed certificates.
    pub fn local(ip_address: &str, app_id: impl Into<String>) -> Self {
        Self::new(RetrieveEndpoint::local(ip_address, app_id)).with_validate_tls(false)
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_validate_tls(mut self, validate_tls: bool) -> Self {
        self.validate_tls = validate_tls;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint.validate()?;
        self.timeouts
            .validate_for_long_poll(self.endpoint.long_polling_window())
            .map_err(Error::configuration)
    }
}

/// [`Transport`] over a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport from validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = ReqwestClient::builder()
            .connect_timeout(config.timeouts.connect_timeout)
            .timeout(config.timeouts.request_timeout)
            .pool_idle_timeout(config.timeouts.keepalive_timeout)
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| Error::HttpClient {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self::from_client(client, config.timeouts.request_timeout))
    }

    /// Wrap an existing client, e.g. one shared with the session layer
    pub fn from_client(client: ReqwestClient, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    fn map_error(&self, error: reqwest::Error, url: &Url, status: Option<u16>) -> TransportError {
        let kind = FailureKind::of(
            error.is_connect(),
            error.is_timeout(),
            is_server_disconnect(&error),
        );

        match kind {
            FailureKind::Connect => TransportError::Connection {
                host: url.host_str().unwrap_or_default().to_string(),
                port: url.port_or_known_default().unwrap_or_default(),
                message: error_chain(&error),
            },
            FailureKind::Timeout => TransportError::Timeout {
                elapsed: self.request_timeout,
            },
            FailureKind::Disconnect => TransportError::ServerDisconnected,
            FailureKind::Response => TransportError::Response {
                status: error.status().map(|s| s.as_u16()).or(status),
                message: error_chain(&error),
            },
        }
    }
}

/// Which [`TransportError`] a reqwest failure becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Connect,
    Timeout,
    Disconnect,
    Response,
}

impl FailureKind {
    /// Connect failures win over timeouts: a connect timeout is reported
    /// against the host and port, not the request timeout.
    fn of(is_connect: bool, is_timeout: bool, disconnected: bool) -> Self {
        if is_connect {
            FailureKind::Connect
        } else if is_timeout {
            FailureKind::Timeout
        } else if disconnected {
            FailureKind::Disconnect
        } else {
            FailureKind::Response
        }
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e, url, None))?;

        let status = response.status().as_u16();
        let content_length = response.content_length();

        // Consumes the response, returning the connection to the pool.
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(e, url, Some(status)))?;

        Ok(TransportResponse {
            status,
            content_length,
            body,
        })
    }
}

/// Render an error and all of its sources, outermost first
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_server_disconnect(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_error.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if cause.to_string().contains(INCOMPLETE_MESSAGE) {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new(RetrieveEndpoint::new("https://host", "app"));
        assert!(config.validate_tls);
        assert_eq!(config.timeouts.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_config_skips_tls_validation() {
        let config = ClientConfig::local("10.0.0.4", "app");
        assert!(!config.validate_tls);
        assert_eq!(config.endpoint.base_url, "https://10.0.0.4");
    }

    #[test]
    fn test_config_rejects_short_request_timeout() {
        let config = ClientConfig::new(RetrieveEndpoint::new("https://host", "app"))
            .with_timeouts(TimeoutConfig::default().with_request_timeout(Duration::from_secs(10)));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(ReqwestTransport::new(&config).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "endpoint": { "base_url": "https://host", "app_id": "app" }
        }))
        .unwrap();
        assert!(config.validate_tls);
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn test_connect_timeout_is_a_connection_failure() {
        assert_eq!(FailureKind::of(true, true, false), FailureKind::Connect);
        assert_eq!(FailureKind::of(true, false, false), FailureKind::Connect);
        assert_eq!(FailureKind::of(false, true, false), FailureKind::Timeout);
        assert_eq!(FailureKind::of(false, false, true), FailureKind::Disconnect);
        assert_eq!(FailureKind::of(false, false, false), FailureKind::Response);
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let err = Error::HttpClient {
            message: "outer".to_string(),
            source: Some(Box::new(io::Error::new(io::ErrorKind::Other, "inner"))),
        };
        assert_eq!(error_chain(&err), "HTTP client error: outer: inner");
    }
}
