//! Shared recording fakes for handler and processor tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use mailduet_agent::{GenerationError, LlmClient};
use mailduet_mail::{
    EmailMessage, GatewayError, Inbox, MailGateway, MessageRef, MessageSummary,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentReply {
    pub inbox_id: String,
    pub message_id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub inbox_id: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Gateway fake that records traffic and can be scripted to fail per call.
#[derive(Default)]
pub struct RecordingGateway {
    replies: Mutex<Vec<SentReply>>,
    sends: Mutex<Vec<SentMessage>>,
    created: Mutex<Vec<String>>,
    registered: Mutex<Vec<(String, String)>>,
    fail_replies: AtomicBool,
    fail_sends: AtomicBool,
    fail_registration: AtomicBool,
    fail_inbox_after: Mutex<Option<usize>>,
}

impl RecordingGateway {
    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().expect("replies lock").clone()
    }

    pub fn sends(&self) -> Vec<SentMessage> {
        self.sends.lock().expect("sends lock").clone()
    }

    pub fn created_inboxes(&self) -> Vec<String> {
        self.created.lock().expect("created lock").clone()
    }

    pub fn registered_webhooks(&self) -> Vec<(String, String)> {
        self.registered.lock().expect("registered lock").clone()
    }

    pub fn fail_replies(&self) {
        self.fail_replies.store(true, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn fail_registration(&self) {
        self.fail_registration.store(true, Ordering::SeqCst);
    }

    /// Fail inbox creation once `count` inboxes already exist.
    pub fn fail_inbox_creation_after(&self, count: usize) {
        *self.fail_inbox_after.lock().expect("fail lock") = Some(count);
    }

    fn unavailable() -> GatewayError {
        GatewayError::Status { status: 503, body: "scripted failure".to_owned() }
    }
}

#[async_trait]
impl MailGateway for RecordingGateway {
    async fn create_inbox(
        &self,
        username: &str,
        _display_name: &str,
    ) -> Result<Inbox, GatewayError> {
        let mut created = self.created.lock().expect("created lock");
        if let Some(limit) = *self.fail_inbox_after.lock().expect("fail lock") {
            if created.len() >= limit {
                return Err(Self::unavailable());
            }
        }
        created.push(username.to_owned());
        Ok(Inbox {
            id: format!("inbox-{username}"),
            email_address: format!("{username}@demo.test"),
        })
    }

    async fn send(
        &self,
        inbox_id: &str,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.sends.lock().expect("sends lock").push(SentMessage {
            inbox_id: inbox_id.to_owned(),
            to: to.to_owned(),
            subject: subject.to_owned(),
            text: text.to_owned(),
        });
        Ok(MessageRef { id: format!("sent-{}", self.sends.lock().expect("sends lock").len()) })
    }

    async fn reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut replies = self.replies.lock().expect("replies lock");
        replies.push(SentReply {
            inbox_id: inbox_id.to_owned(),
            message_id: message_id.to_owned(),
            text: text.to_owned(),
        });
        Ok(MessageRef { id: format!("reply-{}", replies.len()) })
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
            from: "someone@demo.test".to_owned(),
            to: "someone-else@demo.test".to_owned(),
            subject: "recorded".to_owned(),
            body: "recorded body".to_owned(),
            created_at: Utc::now(),
        })
    }

    async fn register_webhook(&self, inbox_id: &str, url: &str) -> Result<(), GatewayError> {
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.registered
            .lock()
            .expect("registered lock")
            .push((inbox_id.to_owned(), url.to_owned()));
        Ok(())
    }
}

/// LLM fake that records prompts and returns a fixed completion.
pub struct RecordingLlm {
    calls: Mutex<Vec<String>>,
    response: String,
}

impl RecordingLlm {
    pub fn new(response: impl Into<String>) -> Self {
        Self { calls: Mutex::new(Vec::new()), response: response.into() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.lock().expect("calls lock").push(prompt.to_owned());
        Ok(self.response.clone())
    }
}

/// LLM fake that always fails.
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Status { status: 503, body: "scripted failure".to_owned() })
    }
}
