//! Retrieve endpoint URL construction
//!
//! Builds the long-poll URL `{base}/Messages/{app_id}/Retrieve` with the query
//! parameters the controller expects.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Default long-polling window in seconds
pub const DEFAULT_LONG_POLLING_TIMEOUT_SECS: u64 = 15;
/// Default number of messages requested per cycle
pub const DEFAULT_MESSAGE_COUNT: u32 = 10;

/// Location and parameters of the retrieve endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveEndpoint {
    /// Scheme and host, e.g. `https://192.168.1.20`
    pub base_url: String,
    /// Application id the session was registered under
    pub app_id: String,
    /// How long the remote may hold the request open
    #[serde(default = "default_long_polling_timeout_secs")]
    pub long_polling_timeout_secs: u64,
    /// Maximum messages returned per cycle
    #[serde(default = "default_message_count")]
    pub message_count: u32,
}

fn default_long_polling_timeout_secs() -> u64 {
    DEFAULT_LONG_POLLING_TIMEOUT_SECS
}

fn default_message_count() -> u32 {
    DEFAULT_MESSAGE_COUNT
}

impl RetrieveEndpoint {
    pub fn new(base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            long_polling_timeout_secs: DEFAULT_LONG_POLLING_TIMEOUT_SECS,
            message_count: DEFAULT_MESSAGE_COUNT,
        }
    }

    /// Endpoint of a controller on the local network
    pub fn local(ip_address: &str, app_id: impl Into<String>) -> Self {
        Self::new(format!("https://{}", ip_address), app_id)
    }

    pub fn with_long_polling_timeout(mut self, seconds: u64) -> Self {
        self.long_polling_timeout_secs = seconds;
        self
    }

    pub fn with_message_count(mut self, count: u32) -> Self {
        self.message_count = count;
        self
    }

    pub fn long_polling_window(&self) -> Duration {
        Duration::from_secs(self.long_polling_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(Error::configuration("Application id cannot be empty"));
        }
        if self.message_count == 0 {
            return Err(Error::configuration("Message count must be at least 1"));
        }
        self.url().map(|_| ())
    }

    /// Build the full retrieve URL
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| Error::Endpoint {
            message: format!("Invalid base URL: {}", self.base_url),
            source: Some(e),
        })?;

        url.path_segments_mut()
            .map_err(|_| Error::Endpoint {
                message: format!("Base URL cannot carry a path: {}", self.base_url),
                source: None,
            })?
            .pop_if_empty()
            .extend(["Messages", self.app_id.as_str(), "Retrieve"]);

        url.query_pairs_mut()
            .append_pair(
                "LongPollingTimeout",
                &self.long_polling_timeout_secs.to_string(),
            )
            .append_pair("StartTime", "1")
            .append_pair("Direction", "Oldest-to-Newest")
            .append_pair("MessageCount", &self.message_count.to_string());

        Ok(url)
    }
}
