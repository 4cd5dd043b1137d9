use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A provider-managed mailbox.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    pub id: String,
    pub email_address: String,
}

/// Reference to a sent message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode provider response: {0}")]
    Decode(String),
}

/// The email-provider seam. Every call is a network RPC that may fail
/// transiently; callers decide what a failure means for their step.
#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn create_inbox(
        &self,
        username: &str,
        display_name: &str,
    ) -> Result<Inbox, GatewayError>;

    async fn send(
        &self,
        inbox_id: &str,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError>;

    /// Reply through the provider's native reply mechanism so threading is
    /// preserved on the recipient side.
    async fn reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError>;

    async fn list(&self, inbox_id: &str) -> Result<Vec<MessageSummary>, GatewayError>;

    async fn get(&self, inbox_id: &str, message_id: &str)
        -> Result<EmailMessage, GatewayError>;

    /// Idempotent: registering a URL that is already registered succeeds.
    async fn register_webhook(&self, inbox_id: &str, url: &str) -> Result<(), GatewayError>;
}

/// Inert gateway for wiring tests and offline smoke runs.
#[derive(Default)]
pub struct NoopMailGateway;

#[async_trait]
impl MailGateway for NoopMailGateway {
    async fn create_inbox(
        &self,
        username: &str,
        _display_name: &str,
    ) -> Result<Inbox, GatewayError> {
        Ok(Inbox {
            id: format!("noop-{username}"),
            email_address: format!("{username}@noop.invalid"),
        })
    }

    async fn send(
        &self,
        _inbox_id: &str,
        _to: &str,
        _subject: &str,
        _text: &str,
    ) -> Result<MessageRef, GatewayError> {
        Ok(MessageRef { id: "noop-message".to_owned() })
    }

    async fn reply(
        &self,
        _inbox_id: &str,
        _message_id: &str,
        _text: &str,
    ) -> Result<MessageRef, GatewayError> {
        Ok(MessageRef { id: "noop-reply".to_owned() })
    }

    async fn list(&self, _inbox_id: &str) -> Result<Vec<MessageSummary>, GatewayError> {
        Ok(Vec::new())
    }

    async fn get(
        &self,
        _inbox_id: &str,
        message_id: &str,
    ) -> Result<EmailMessage, GatewayError> {
        Ok(EmailMessage {
            id: message_id.to_owned(),
            from: String::new(),
            to: String::new(),
            subject: String::new(),
            body: String::new(),
            created_at: Utc::now(),
        })
    }

    async fn register_webhook(&self, _inbox_id: &str, _url: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}
