use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use mailduet_core::domain::session::{DemoSession, NewSession};

pub mod memory;
pub mod processed_event;
pub mod session;
pub mod webhook_log;

pub use memory::{
    InMemoryProcessedEventRepository, InMemorySessionRepository, InMemoryWebhookLogRepository,
};
pub use processed_event::SqlProcessedEventRepository;
pub use session::SqlSessionRepository;
pub use webhook_log::SqlWebhookLogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("session {session_id} does not exist")]
    SessionMissing { session_id: i64 },
    #[error("exchange cap reached for session {session_id}")]
    CapExceeded { session_id: i64 },
}

/// The session store. At most one session is active; creating a new one
/// replaces the previous one atomically.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, new_session: NewSession) -> Result<DemoSession, RepositoryError>;

    async fn active(&self) -> Result<Option<DemoSession>, RepositoryError>;

    /// Single atomic compare-and-increment of the exchange counter. At the
    /// cap this fails with `CapExceeded` without modifying the row, so two
    /// racing callers can never both advance past the limit.
    async fn increment_exchange(&self, session_id: i64) -> Result<DemoSession, RepositoryError>;
}

/// The processed-delivery set backing webhook idempotency.
#[async_trait]
pub trait ProcessedEventRepository: Send + Sync {
    /// Record `event_id` as processed. Returns `true` on first sight and
    /// `false` for a replay. The check and the record are one atomic step.
    async fn record_if_new(&self, event_id: &str) -> Result<bool, RepositoryError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookLogEntry {
    pub id: String,
    pub event_id: String,
    pub inbox_id: String,
    pub sender: String,
    pub subject: String,
    pub outcome: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Operator-visible journal of webhook processing decisions.
#[async_trait]
pub trait WebhookLogRepository: Send + Sync {
    async fn record(&self, entry: WebhookLogEntry) -> Result<(), RepositoryError>;

    async fn recent(&self, limit: u32) -> Result<Vec<WebhookLogEntry>, RepositoryError>;
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("bad timestamp `{raw}`: {error}")))
}
