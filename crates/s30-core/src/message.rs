//! Retrieved message envelope and the sink messages are handed to
//!
//! The pump only understands the envelope. What a message's `Data` means is up
//! to the [`MessageSink`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Body of a 200 response from the retrieve endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl MessageEnvelope {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

/// A single message from the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "MessageType", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(
        rename = "MessageID",
        alias = "MessageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    #[serde(
        rename = "SenderID",
        alias = "SenderId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sender_id: Option<String>,
    #[serde(
        rename = "TargetID",
        alias = "TargetId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_id: Option<String>,
    #[serde(rename = "Data", default)]
    pub data: Value,
}

/// Receives each retrieved message in order
pub trait MessageSink {
    fn process_message(&mut self, message: Message) -> anyhow::Result<()>;
}

impl MessageSink for Vec<Message> {
    fn process_message(&mut self, message: Message) -> anyhow::Result<()> {
        self.push(message);
        Ok(())
    }
}

impl MessageSink for mpsc::UnboundedSender<Message> {
    fn process_message(&mut self, message: Message) -> anyhow::Result<()> {
        self.send(message)
            .map_err(|_| anyhow::anyhow!("message receiver has been dropped"))
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn process_message(&mut self, message: Message) -> anyhow::Result<()> {
        (**self).process_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope() {
        let body = json!({
            "messages": [
                {
                    "MessageType": "PropertyChange",
                    "SenderID": "LCC",
                    "MessageID": "1",
                    "TargetID": "mapp_test",
                    "Data": { "system": { "status": { "outdoorTemperature": 71 } } }
                },
                {
                    "SenderId": "KL21J00001",
                    "MessageId": "2",
                    "Data": { "zones": [] }
                }
            ]
        })
        .to_string();

        let envelope = MessageEnvelope::from_json(&body).unwrap();
        assert_eq!(envelope.len(), 2);
        assert_eq!(envelope.messages[0].sender_id.as_deref(), Some("LCC"));
        assert_eq!(envelope.messages[0].message_type.as_deref(), Some("PropertyChange"));
        assert_eq!(envelope.messages[1].sender_id.as_deref(), Some("KL21J00001"));
        assert_eq!(envelope.messages[1].message_id.as_deref(), Some("2"));
        assert_eq!(envelope.messages[1].target_id, None);
        assert_eq!(envelope.messages[0].data["system"]["status"]["outdoorTemperature"], 71);
    }

    #[test]
    fn test_missing_messages_is_empty() {
        let envelope = MessageEnvelope::from_json("{}").unwrap();
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(MessageEnvelope::from_json("<html>oops</html>").is_err());
        assert!(MessageEnvelope::from_json("{\"messages\": 3}").is_err());
    }

    #[test]
    fn test_channel_sink() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        let message = Message {
            message_type: None,
            message_id: Some("7".to_string()),
            sender_id: None,
            target_id: None,
            data: Value::Null,
        };
        tx.process_message(message.clone()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), message);

        drop(rx);
        assert!(tx.process_message(message).is_err());
    }
}
