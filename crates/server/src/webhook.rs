//! Inbound webhook endpoint.
//!
//! The provider's retry budget is short, so the handler acknowledges with
//! 200 before any business logic runs: processing happens on a spawned
//! task. The only pre-ack work is signature verification (an authenticity
//! gate, not business logic) and envelope parsing; malformed payloads are
//! acknowledged so the provider does not redeliver them.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, warn};

use mailduet_mail::{verify_signature, WebhookEnvelope};

use crate::processor::WebhookProcessor;

pub const SIGNATURE_HEADER: &str = "x-inboxrelay-signature";

#[derive(Clone)]
pub struct WebhookState {
    pub processor: Arc<WebhookProcessor>,
    pub webhook_secret: Option<String>,
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/webhooks/mail", post(receive)).with_state(state)
}

async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if let Some(secret) = &state.webhook_secret {
        let claimed =
            headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok()).unwrap_or("");
        if !verify_signature(secret, &body, claimed) {
            warn!(
                event_name = "webhook.signature_rejected",
                "webhook payload failed signature verification"
            );
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid signature" })));
        }
    }

    let envelope = match WebhookEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(error) => {
            // Acknowledged on purpose: a retry would be just as malformed.
            warn!(
                event_name = "webhook.malformed_payload",
                error = %error,
                "acknowledging unparseable webhook payload"
            );
            return (StatusCode::OK, Json(json!({ "ok": true })));
        }
    };

    let event_id = envelope.event_id.clone();
    match envelope.into_inbound() {
        Some(event) => {
            let processor = state.processor.clone();
            tokio::spawn(async move {
                processor.process(event).await;
            });
        }
        None => {
            debug!(
                event_name = "webhook.event_ignored",
                event_id = %event_id,
                "acknowledging non-message webhook event"
            );
        }
    }

    (StatusCode::OK, Json(json!({ "ok": true })))
}
