use chrono::{DateTime, Utc};
use serde::Serialize;

/// A demo conversation: one seller inbox paired with one buyer inbox.
///
/// `created_at` doubles as the admissibility low-water mark: inbound mail
/// created before it is treated as a provider replay of pre-session history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DemoSession {
    pub id: i64,
    pub seller_inbox_id: String,
    pub seller_address: String,
    pub buyer_inbox_id: String,
    pub buyer_address: String,
    pub exchange_count: i64,
    pub max_exchanges: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a session. The store assigns the row id and stamps
/// `created_at`; `max_exchanges` is frozen here so a later config change
/// never moves the cap of a running conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSession {
    pub seller_inbox_id: String,
    pub seller_address: String,
    pub buyer_inbox_id: String,
    pub buyer_address: String,
    pub max_exchanges: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Collecting,
    Exchanging,
    Capped,
}

impl DemoSession {
    pub fn phase(&self) -> SessionPhase {
        if self.exchange_count >= self.max_exchanges {
            SessionPhase::Capped
        } else if self.exchange_count == 0 {
            SessionPhase::Collecting
        } else {
            SessionPhase::Exchanging
        }
    }

    pub fn at_cap(&self) -> bool {
        self.exchange_count >= self.max_exchanges
    }

    /// True when the message timestamp predates this session.
    pub fn predates(&self, message_created_at: DateTime<Utc>) -> bool {
        message_created_at < self.created_at
    }
}
