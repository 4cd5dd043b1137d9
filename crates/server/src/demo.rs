//! Demo control API: session initialization and read-side endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use mailduet_agent::{prompts, GenerationError, LlmClient};
use mailduet_core::domain::session::NewSession;
use mailduet_core::personas::DemoCast;
use mailduet_db::{RepositoryError, SessionRepository, WebhookLogRepository};
use mailduet_mail::{GatewayError, MailGateway};

#[derive(Clone)]
pub struct DemoState {
    pub sessions: Arc<dyn SessionRepository>,
    pub journal: Arc<dyn WebhookLogRepository>,
    pub gateway: Arc<dyn MailGateway>,
    pub llm: Arc<dyn LlmClient>,
    pub cast: Arc<DemoCast>,
    pub max_exchanges: u32,
    pub public_base_url: Option<String>,
}

pub fn router(state: DemoState) -> Router {
    Router::new()
        .route("/api/demo/initialize", post(initialize_handler))
        .route("/api/demo/messages", get(messages_handler))
        .route("/api/demo/webhooks", get(webhooks_handler))
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DemoAddresses {
    pub seller: String,
    pub buyer: String,
}

#[derive(Debug, Error)]
pub enum InitializeError {
    #[error("seller inbox creation failed: {0}")]
    SellerInbox(#[source] GatewayError),
    #[error("buyer inbox creation failed: {0}")]
    BuyerInbox(#[source] GatewayError),
    #[error("session store failed: {0}")]
    Session(#[from] RepositoryError),
    #[error("opening message generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("opening message send failed: {0}")]
    Send(#[source] GatewayError),
}

/// Stand up a fresh demo: two new inboxes, a replacement session, webhook
/// registrations, and the seller's opening email.
///
/// Inbox creation is all-or-nothing: a failure on either side aborts before
/// any session is stored, so there is never a half-created pairing. Webhook
/// registration failures degrade to poll-only mode instead of failing.
pub async fn initialize(state: &DemoState) -> Result<DemoAddresses, InitializeError> {
    // Time-based usernames keep each run clear of pre-existing inboxes and
    // their historical mail.
    let stamp = Utc::now().timestamp_millis();
    let seller_inbox = state
        .gateway
        .create_inbox(&format!("seller-{stamp}"), &state.cast.seller.name)
        .await
        .map_err(InitializeError::SellerInbox)?;
    let buyer_inbox = state
        .gateway
        .create_inbox(&format!("buyer-{stamp}"), &state.cast.buyer.name)
        .await
        .map_err(InitializeError::BuyerInbox)?;

    let session = state
        .sessions
        .create(NewSession {
            seller_inbox_id: seller_inbox.id.clone(),
            seller_address: seller_inbox.email_address.clone(),
            buyer_inbox_id: buyer_inbox.id.clone(),
            buyer_address: buyer_inbox.email_address.clone(),
            max_exchanges: i64::from(state.max_exchanges),
        })
        .await?;

    register_webhooks(state, &[&seller_inbox.id, &buyer_inbox.id]).await;

    let opening = state.llm.complete(&prompts::seller_opening(&state.cast)).await?;
    let subject = format!("Quick intro from {}", state.cast.seller.company);
    state
        .gateway
        .send(&seller_inbox.id, &buyer_inbox.email_address, &subject, &opening)
        .await
        .map_err(InitializeError::Send)?;

    info!(
        event_name = "demo.initialized",
        session_id = session.id,
        seller = %seller_inbox.email_address,
        buyer = %buyer_inbox.email_address,
        max_exchanges = state.max_exchanges,
        "demo session initialized"
    );

    Ok(DemoAddresses {
        seller: seller_inbox.email_address,
        buyer: buyer_inbox.email_address,
    })
}

async fn register_webhooks(state: &DemoState, inbox_ids: &[&str]) {
    let Some(base_url) = &state.public_base_url else {
        warn!(
            event_name = "demo.webhooks_skipped",
            "demo.public_base_url is not set; running in poll-only mode"
        );
        return;
    };

    let url = format!("{}/webhooks/mail", base_url.trim_end_matches('/'));
    for inbox_id in inbox_ids {
        if let Err(error) = state.gateway.register_webhook(inbox_id, &url).await {
            warn!(
                event_name = "demo.webhook_registration_failed",
                inbox_id = %inbox_id,
                url = %url,
                error = %error,
                "continuing without inbound-triggered replies for this inbox"
            );
        }
    }
}

async fn initialize_handler(
    State(state): State<DemoState>,
) -> Result<Json<DemoAddresses>, (StatusCode, Json<Value>)> {
    match initialize(&state).await {
        Ok(addresses) => Ok(Json(addresses)),
        Err(error) => {
            error!(
                event_name = "demo.initialize_failed",
                error = %error,
                "demo initialization failed"
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            ))
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct DemoMessageView {
    mailbox: &'static str,
    id: String,
    from: String,
    subject: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct MessagesResponse {
    initialized: bool,
    seller: Option<String>,
    buyer: Option<String>,
    messages: Vec<DemoMessageView>,
}

async fn messages_handler(
    State(state): State<DemoState>,
) -> Result<Json<MessagesResponse>, (StatusCode, Json<Value>)> {
    let session = state.sessions.active().await.map_err(internal_error)?;
    let Some(session) = session else {
        return Ok(Json(MessagesResponse {
            initialized: false,
            seller: None,
            buyer: None,
            messages: Vec::new(),
        }));
    };

    let mut messages = Vec::new();
    let mailboxes = [
        ("seller", session.seller_inbox_id.as_str()),
        ("buyer", session.buyer_inbox_id.as_str()),
    ];
    for (mailbox, inbox_id) in mailboxes {
        let summaries = state.gateway.list(inbox_id).await.map_err(internal_error)?;
        for summary in summaries {
            let full = state.gateway.get(inbox_id, &summary.id).await.map_err(internal_error)?;
            messages.push(DemoMessageView {
                mailbox,
                id: full.id,
                from: full.from,
                subject: full.subject,
                body: full.body,
                created_at: full.created_at,
            });
        }
    }
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Ok(Json(MessagesResponse {
        initialized: true,
        seller: Some(session.seller_address),
        buyer: Some(session.buyer_address),
        messages,
    }))
}

#[derive(Debug, Serialize)]
struct WebhookEventView {
    event_id: String,
    inbox_id: String,
    sender: String,
    subject: String,
    outcome: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

async fn webhooks_handler(
    State(state): State<DemoState>,
) -> Result<Json<Vec<WebhookEventView>>, (StatusCode, Json<Value>)> {
    let entries = state.journal.recent(50).await.map_err(internal_error)?;
    let views = entries
        .into_iter()
        .map(|entry| WebhookEventView {
            event_id: entry.event_id,
            inbox_id: entry.inbox_id,
            sender: entry.sender,
            subject: entry.subject,
            outcome: entry.outcome,
            detail: entry.detail,
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(views))
}

fn internal_error(error: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": error.to_string() })))
}
