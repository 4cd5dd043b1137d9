use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::DemoSession;

/// An inbound message delivery pushed by the email provider.
///
/// `event_id` identifies the delivery, not the message: the provider may
/// redeliver the same event id under its at-least-once contract, and in
/// rare replay windows may redeliver historical messages under fresh ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEmail {
    pub event_id: String,
    pub message_id: String,
    pub inbox_id: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of the conversation received the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxRole {
    Seller,
    Buyer,
}

impl InboxRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }
}

/// Match the recipient inbox against the session's two inboxes.
pub fn attribute_role(session: &DemoSession, inbox_id: &str) -> Option<InboxRole> {
    if inbox_id == session.seller_inbox_id {
        Some(InboxRole::Seller)
    } else if inbox_id == session.buyer_inbox_id {
        Some(InboxRole::Buyer)
    } else {
        None
    }
}
