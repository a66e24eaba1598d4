//! HTTP layer for the retrieve endpoint
//!
//! This module provides:
//! - The remote error taxonomy returned by the pump
//! - Retrieve endpoint URL construction
//! - Timeout configuration for long polling
//! - The injectable transport capability and its reqwest implementation

pub mod error;
pub mod endpoint;
pub mod timeout;
pub mod transport;
pub mod client;

pub use error::{ErrorKind, RemoteError};
pub use endpoint::RetrieveEndpoint;
pub use timeout::TimeoutConfig;
pub use transport::{Transport, TransportError, TransportResponse};
pub use client::{ClientConfig, ReqwestTransport};
