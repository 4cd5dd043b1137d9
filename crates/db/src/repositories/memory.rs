//! In-memory repository mirrors for orchestrator tests. They implement the
//! same contracts as the SQL repositories, including replace semantics and
//! the atomic cap guard, with a mutex standing in for the database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use mailduet_core::domain::session::{DemoSession, NewSession};

use super::{
    ProcessedEventRepository, RepositoryError, SessionRepository, WebhookLogEntry,
    WebhookLogRepository,
};

#[derive(Default)]
pub struct InMemorySessionRepository {
    session: Mutex<Option<DemoSession>>,
    next_id: AtomicI64,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing session directly, bypassing creation (test setup).
    pub fn seed(&self, session: DemoSession) {
        *self.session.lock().expect("session lock") = Some(session);
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, new_session: NewSession) -> Result<DemoSession, RepositoryError> {
        let session = DemoSession {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            seller_inbox_id: new_session.seller_inbox_id,
            seller_address: new_session.seller_address,
            buyer_inbox_id: new_session.buyer_inbox_id,
            buyer_address: new_session.buyer_address,
            exchange_count: 0,
            max_exchanges: new_session.max_exchanges,
            created_at: Utc::now(),
        };
        *self.session.lock().expect("session lock") = Some(session.clone());
        Ok(session)
    }

    async fn active(&self) -> Result<Option<DemoSession>, RepositoryError> {
        Ok(self.session.lock().expect("session lock").clone())
    }

    async fn increment_exchange(&self, session_id: i64) -> Result<DemoSession, RepositoryError> {
        let mut guard = self.session.lock().expect("session lock");
        let session = guard
            .as_mut()
            .filter(|session| session.id == session_id)
            .ok_or(RepositoryError::SessionMissing { session_id })?;

        if session.exchange_count >= session.max_exchanges {
            return Err(RepositoryError::CapExceeded { session_id });
        }
        session.exchange_count += 1;
        Ok(session.clone())
    }
}

#[derive(Default)]
pub struct InMemoryProcessedEventRepository {
    seen: Mutex<HashSet<String>>,
}

impl InMemoryProcessedEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProcessedEventRepository for InMemoryProcessedEventRepository {
    async fn record_if_new(&self, event_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.seen.lock().expect("seen lock").insert(event_id.to_owned()))
    }
}

#[derive(Default)]
pub struct InMemoryWebhookLogRepository {
    entries: Mutex<Vec<WebhookLogEntry>>,
}

impl InMemoryWebhookLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<WebhookLogEntry> {
        self.entries.lock().expect("entries lock").clone()
    }
}

#[async_trait::async_trait]
impl WebhookLogRepository for InMemoryWebhookLogRepository {
    async fn record(&self, entry: WebhookLogEntry) -> Result<(), RepositoryError> {
        self.entries.lock().expect("entries lock").push(entry);
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<WebhookLogEntry>, RepositoryError> {
        let entries = self.entries.lock().expect("entries lock");
        let mut recent: Vec<WebhookLogEntry> = entries.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit as usize);
        Ok(recent)
    }
}
