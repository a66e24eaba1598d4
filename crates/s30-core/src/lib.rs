//! S30 Core - communication layer for the S30 HVAC control API
//!
//! This crate provides the message pump: the component that long-polls the
//! controller's retrieve endpoint and turns every outcome of that call into
//! "no data", "messages retrieved" or a typed [`RemoteError`].
//!
//! # Main Components
//!
//! - **Message Pump**: one long-poll request per cycle, classified and logged
//! - **Error Taxonomy**: [`ErrorKind`] and [`RemoteError`], using `thiserror`
//! - **Transport**: injectable [`Transport`] capability with a reqwest implementation
//! - **Configuration**: endpoint and timeout settings for long polling
//!
//! # Example
//!
//! ```no_run
//! use s30_core::{ClientConfig, ErrorKind, Message, MessagePump};
//!
//! async fn poll_forever() -> s30_core::Result<()> {
//!     let config = ClientConfig::local("192.168.1.20", "mapp_example");
//!     let mut pump = MessagePump::from_config(&config, Vec::<Message>::new())?;
//!     loop {
//!         match pump.pump().await {
//!             Ok(true) => pump.sink_mut().clear(),
//!             Ok(false) => {}
//!             Err(e) if e.kind == ErrorKind::Unauthorized => return Err(e.into()),
//!             Err(e) if e.is_retryable() => continue,
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod message;
pub mod pump;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use http::{
    ClientConfig, ErrorKind, RemoteError, ReqwestTransport, RetrieveEndpoint, TimeoutConfig,
    Transport, TransportError, TransportResponse,
};
pub use message::{Message, MessageEnvelope, MessageSink};
pub use pump::{
    classify_response, classify_transport_error, MessagePump, PumpOutcome, PumpResult,
    SERVER_DISCONNECTED, UNEXPECTED_CONTENT_LENGTH,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
