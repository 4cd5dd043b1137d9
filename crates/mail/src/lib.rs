pub mod gateway;
pub mod http;
pub mod signature;
pub mod strip;
pub mod webhook;

pub use gateway::{
    EmailMessage, GatewayError, Inbox, MailGateway, MessageRef, MessageSummary, NoopMailGateway,
};
pub use http::HttpMailGateway;
pub use signature::{sign_body, verify_signature};
pub use strip::strip_quoted_history;
pub use webhook::{MessagePayload, WebhookEnvelope, MESSAGE_RECEIVED};
