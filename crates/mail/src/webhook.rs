use chrono::{DateTime, Utc};
use serde::Deserialize;

use mailduet_core::domain::message::InboundEmail;

/// Event type carried by message-delivery notifications. Other event types
/// (inbox lifecycle, bounce reports) are acknowledged and ignored.
pub const MESSAGE_RECEIVED: &str = "message_received";

/// The provider's webhook envelope. `event_id` identifies the delivery and
/// repeats when the provider retries; `message` is present only for
/// message-delivery events.
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event_type: String,
    pub event_id: String,
    #[serde(default)]
    pub message: Option<MessagePayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MessagePayload {
    pub message_id: String,
    pub inbox_id: String,
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WebhookEnvelope {
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// The inbound event this delivery describes, if it describes one.
    pub fn into_inbound(self) -> Option<InboundEmail> {
        if self.event_type != MESSAGE_RECEIVED {
            return None;
        }
        let message = self.message?;
        let body = message.text.or(message.html).unwrap_or_default();
        Some(InboundEmail {
            event_id: self.event_id,
            message_id: message.message_id,
            inbox_id: message.inbox_id,
            from: message.from,
            subject: message.subject,
            body,
            created_at: message.created_at,
        })
    }
}
