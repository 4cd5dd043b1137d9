//! The webhook event processor.
//!
//! Runs after the HTTP 200 acknowledgement has already been returned, so
//! nothing here may propagate to a response: every path resolves to an
//! `EventOutcome`, is logged with context, and is recorded in the webhook
//! journal for operator visibility.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use mailduet_agent::prompts;
use mailduet_agent::LlmClient;
use mailduet_core::domain::message::{attribute_role, InboundEmail, InboxRole};
use mailduet_core::domain::session::DemoSession;
use mailduet_core::personas::DemoCast;
use mailduet_core::scoring::FitScorer;
use mailduet_core::EventOutcome;
use mailduet_db::{
    ProcessedEventRepository, SessionRepository, WebhookLogEntry, WebhookLogRepository,
};
use mailduet_mail::{strip_quoted_history, MailGateway};

pub struct WebhookProcessor {
    sessions: Arc<dyn SessionRepository>,
    processed: Arc<dyn ProcessedEventRepository>,
    journal: Arc<dyn WebhookLogRepository>,
    gateway: Arc<dyn MailGateway>,
    llm: Arc<dyn LlmClient>,
    cast: DemoCast,
    scorer: FitScorer,
    // Serializes cap-check through increment for the single active session,
    // closing the window where two deliveries both pass the cap check.
    reply_gate: tokio::sync::Mutex<()>,
}

impl WebhookProcessor {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        processed: Arc<dyn ProcessedEventRepository>,
        journal: Arc<dyn WebhookLogRepository>,
        gateway: Arc<dyn MailGateway>,
        llm: Arc<dyn LlmClient>,
        cast: DemoCast,
        scorer: FitScorer,
    ) -> Self {
        Self {
            sessions,
            processed,
            journal,
            gateway,
            llm,
            cast,
            scorer,
            reply_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn process(&self, event: InboundEmail) -> EventOutcome {
        let outcome = self.handle(&event).await;

        match &outcome {
            EventOutcome::Failed { detail } => error!(
                event_name = "webhook.delivery_failed",
                event_id = %event.event_id,
                inbox_id = %event.inbox_id,
                sender = %event.from,
                subject = %event.subject,
                detail = %detail,
                "delivery attempt abandoned"
            ),
            EventOutcome::NoSession => warn!(
                event_name = "webhook.no_session",
                event_id = %event.event_id,
                inbox_id = %event.inbox_id,
                "inbound event with no active session"
            ),
            other => info!(
                event_name = "webhook.processed",
                event_id = %event.event_id,
                inbox_id = %event.inbox_id,
                outcome = other.label(),
                "inbound event settled"
            ),
        }

        self.journal_outcome(&event, &outcome).await;
        outcome
    }

    async fn handle(&self, event: &InboundEmail) -> EventOutcome {
        // The dedup record and the first-sight check are one atomic step;
        // a concurrent duplicate delivery loses here, before any work.
        match self.processed.record_if_new(&event.event_id).await {
            Ok(true) => {}
            Ok(false) => return EventOutcome::Duplicate,
            Err(error) => {
                return EventOutcome::Failed { detail: format!("dedup store: {error}") }
            }
        }

        let session = match self.sessions.active().await {
            Ok(Some(session)) => session,
            Ok(None) => return EventOutcome::NoSession,
            Err(error) => {
                return EventOutcome::Failed { detail: format!("session store: {error}") }
            }
        };

        // Provider replays of pre-session history fall below the low-water mark.
        if session.predates(event.created_at) {
            return EventOutcome::Stale;
        }

        let Some(role) = attribute_role(&session, &event.inbox_id) else {
            return EventOutcome::UnknownRecipient;
        };

        let _gate = self.reply_gate.lock().await;

        // Re-read inside the gate so the cap check sees the latest counter.
        let session = match self.sessions.active().await {
            Ok(Some(session)) => session,
            Ok(None) => return EventOutcome::NoSession,
            Err(error) => {
                return EventOutcome::Failed { detail: format!("session store: {error}") }
            }
        };
        if session.at_cap() {
            return EventOutcome::Capped;
        }

        self.generate_and_reply(event, &session, role).await
    }

    async fn generate_and_reply(
        &self,
        event: &InboundEmail,
        session: &DemoSession,
        role: InboxRole,
    ) -> EventOutcome {
        let cleaned = strip_quoted_history(&event.body);

        let prompt = match role {
            InboxRole::Seller => {
                let report = self.scorer.score(
                    &self.cast.seller.criteria,
                    &self.cast.buyer.profile,
                    &cleaned,
                );
                info!(
                    event_name = "webhook.fit_scored",
                    event_id = %event.event_id,
                    overall = report.overall,
                    recommendation = report.recommendation.as_str(),
                    "qualification score computed"
                );
                prompts::seller_reply(&self.cast, &event.from, &event.subject, &cleaned, &report)
            }
            InboxRole::Buyer => {
                prompts::buyer_reply(&self.cast, &event.from, &event.subject, &cleaned)
            }
        };

        let text = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                return EventOutcome::Failed { detail: format!("generation: {error}") }
            }
        };

        if let Err(error) = self.gateway.reply(&event.inbox_id, &event.message_id, &text).await {
            return EventOutcome::Failed { detail: format!("reply send: {error}") };
        }

        // State advances only on a successful send; a failure above leaves
        // the session eligible for exactly one more attempt.
        match self.sessions.increment_exchange(session.id).await {
            Ok(_) => EventOutcome::Replied { role },
            Err(error) => {
                EventOutcome::Failed { detail: format!("exchange increment: {error}") }
            }
        }
    }

    async fn journal_outcome(&self, event: &InboundEmail, outcome: &EventOutcome) {
        let entry = WebhookLogEntry {
            id: Uuid::new_v4().to_string(),
            event_id: event.event_id.clone(),
            inbox_id: event.inbox_id.clone(),
            sender: event.from.clone(),
            subject: event.subject.clone(),
            outcome: outcome.label().to_owned(),
            detail: outcome.detail().map(ToOwned::to_owned),
            created_at: Utc::now(),
        };

        if let Err(error) = self.journal.record(entry).await {
            warn!(
                event_name = "webhook.journal_write_failed",
                event_id = %event.event_id,
                error = %error,
                "could not record webhook journal entry"
            );
        }
    }
}
