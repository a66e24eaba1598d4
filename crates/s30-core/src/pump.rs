//! The message pump
//!
//! One call to [`MessagePump::pump`] issues one long-poll request and turns
//! its outcome into exactly one of:
//! - `Ok(false)`: the remote had nothing new
//! - `Ok(true)`: messages were retrieved and handed to the sink
//! - `Err(RemoteError)`: a classified failure
//!
//! Classification happens in [`classify_response`] and
//! [`classify_transport_error`], which are also where logging happens.
//! Protocol errors are logged at INFO; transport errors at DEBUG, except
//! disconnects, connection failures and timeouts, whose error message already
//! says everything and which are not logged at all.

use tracing::{debug, info};
use url::Url;

use crate::http::{
    ClientConfig, RemoteError, ReqwestTransport, RetrieveEndpoint, Transport, TransportError,
    TransportResponse,
};
use crate::message::{MessageEnvelope, MessageSink};
use crate::Result;

/// Transport error text the remote produces instead of a clean 204.
///
/// The service sometimes signals "nothing new" with a zero or malformed
/// Content-Length header, which surfaces as a response error carrying this
/// phrase. Any response error containing it is treated as no content.
pub const UNEXPECTED_CONTENT_LENGTH: &str = "unexpected content-length header";

/// Message of the error returned when the remote hangs up mid-request
pub const SERVER_DISCONNECTED: &str = "Server Disconnected";

/// Outcome of a single pump cycle that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum PumpOutcome {
    /// The remote had nothing new (204 or equivalent)
    NoData,
    /// The remote returned a message envelope
    Success(MessageEnvelope),
}

impl PumpOutcome {
    pub fn has_data(&self) -> bool {
        matches!(self, PumpOutcome::Success(_))
    }
}

/// Result of classifying one pump cycle
pub type PumpResult = std::result::Result<PumpOutcome, RemoteError>;

/// Classify a response that made it back from the remote
pub fn classify_response(response: TransportResponse) -> PumpResult {
    match response.status {
        204 => Ok(PumpOutcome::NoData),
        200 if response.content_length == Some(0) || response.body.trim().is_empty() => {
            debug!(status = 200, "Retrieve returned an empty body, treating as 204 no content");
            Ok(PumpOutcome::NoData)
        }
        200 => match MessageEnvelope::from_json(&response.body) {
            Ok(envelope) => Ok(PumpOutcome::Success(envelope)),
            Err(e) => {
                info!(status = 200, "Retrieve returned an unreadable message envelope: {}", e);
                Err(RemoteError::process_message(format!("Invalid message envelope: {}", e))
                    .with_reference(200))
            }
        },
        401 => {
            info!(status = 401, "Retrieve rejected as unauthorized");
            Err(RemoteError::unauthorized("Retrieve rejected as unauthorized (HTTP 401)"))
        }
        status => {
            info!(status, "Retrieve failed with HTTP status {}", status);
            Err(RemoteError::http_protocol(
                status,
                format!("Retrieve failed with HTTP status {}", status),
            ))
        }
    }
}

/// Classify a failure raised by the transport
pub fn classify_transport_error(error: TransportError) -> PumpResult {
    match error {
        TransportError::Response { message, .. } if message.contains(UNEXPECTED_CONTENT_LENGTH) => {
            debug!("Retrieve response error: {}", message);
            debug!("Treating response error as HTTP 204 no content");
            Ok(PumpOutcome::NoData)
        }
        TransportError::Response { status, message } => {
            debug!(status = ?status, "Retrieve response error: {}", message);
            let error = RemoteError::communication(format!("Retrieve response error: {}", message));
            Err(match status {
                Some(status) => error.with_reference(status),
                None => error,
            })
        }
        TransportError::ServerDisconnected => {
            Err(RemoteError::communication(SERVER_DISCONNECTED))
        }
        error @ (TransportError::Connection { .. } | TransportError::Timeout { .. }) => {
            Err(RemoteError::communication(error.to_string()))
        }
    }
}

/// Long-poll message pump over an injected transport
pub struct MessagePump<T, S> {
    transport: T,
    url: Url,
    sink: S,
}

impl<T: Transport, S: MessageSink> MessagePump<T, S> {
    /// Create a pump for the given endpoint
    pub fn new(transport: T, endpoint: &RetrieveEndpoint, sink: S) -> Result<Self> {
        endpoint.validate()?;
        let url = endpoint.url()?;
        Ok(Self {
            transport,
            url,
            sink,
        })
    }

    /// The retrieve URL every cycle requests
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run one cycle and return the classified outcome without handing it off
    pub async fn poll(&self) -> PumpResult {
        match self.transport.get(&self.url).await {
            Ok(response) => classify_response(response),
            Err(error) => classify_transport_error(error),
        }
    }

    /// Run one cycle, handing every retrieved message to the sink.
    ///
    /// Returns `true` when messages were retrieved, `false` when the remote had
    /// nothing new.
    pub async fn pump(&mut self) -> std::result::Result<bool, RemoteError> {
        let envelope = match self.poll().await? {
            PumpOutcome::NoData => return Ok(false),
            PumpOutcome::Success(envelope) => envelope,
        };

        for message in envelope.messages {
            let message_id = message.message_id.clone().unwrap_or_default();
            if let Err(e) = self.sink.process_message(message) {
                info!(message_id = %message_id, "Failed to process message: {:#}", e);
                return Err(RemoteError::process_message(format!(
                    "Failed to process message [{}]: {:#}",
                    message_id, e
                )));
            }
        }

        Ok(true)
    }
}

impl<S: MessageSink> MessagePump<ReqwestTransport, S> {
    /// Create a pump backed by a pooled reqwest client
    pub fn from_config(config: &ClientConfig, sink: S) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::new(transport, &config.endpoint, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ErrorKind;
    use std::time::Duration;

    #[test]
    fn test_204_is_no_data() {
        assert_eq!(classify_response(TransportResponse::empty(204)), Ok(PumpOutcome::NoData));
    }

    #[test]
    fn test_empty_200_is_no_data() {
        assert_eq!(classify_response(TransportResponse::empty(200)), Ok(PumpOutcome::NoData));
        let mut response = TransportResponse::new(200, "   ");
        response.content_length = None;
        assert_eq!(classify_response(response), Ok(PumpOutcome::NoData));
    }

    #[test]
    fn test_200_with_envelope() {
        let body = r#"{"messages":[{"MessageID":"1","SenderID":"LCC","Data":{}}]}"#;
        let outcome = classify_response(TransportResponse::new(200, body)).unwrap();
        assert!(outcome.has_data());
        match outcome {
            PumpOutcome::Success(envelope) => assert_eq!(envelope.len(), 1),
            PumpOutcome::NoData => panic!("expected messages"),
        }
    }

    #[test]
    fn test_200_with_garbage() {
        let err = classify_response(TransportResponse::new(200, "not json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProcessMessage);
        assert_eq!(err.reference, Some(200));
    }

    #[test]
    fn test_unexpected_statuses_are_protocol_errors() {
        for status in [100, 202, 302, 404, 500] {
            let err = classify_response(TransportResponse::empty(status)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::HttpProtocol);
            assert_eq!(err.reference, Some(status));
        }
    }

    #[test]
    fn test_response_error_keeps_status_as_reference() {
        let err = classify_transport_error(TransportError::Response {
            status: Some(400),
            message: "some other error".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Communication);
        assert_eq!(err.reference, Some(400));
        assert!(err.message.contains("some other error"));
    }

    #[test]
    fn test_timeout_is_communication_error() {
        let err = classify_transport_error(TransportError::Timeout {
            elapsed: Duration::from_secs(30),
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Communication);
        assert!(err.message.contains("timed out"));
        assert!(err.is_retryable());
    }
}
