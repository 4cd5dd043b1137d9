use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use mailduet_core::config::MailConfig;

use crate::gateway::{
    EmailMessage, GatewayError, Inbox, MailGateway, MessageRef, MessageSummary,
};

/// REST client for the email-API provider. All requests are bearer
/// authenticated and bounded by the configured timeout.
pub struct HttpMailGateway {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpMailGateway {
    pub fn from_config(config: &MailConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_key.expose_secret())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), body });
        }
        serde_json::from_str(&body).map_err(|error| GatewayError::Decode(error.to_string()))
    }
}

#[async_trait]
impl MailGateway for HttpMailGateway {
    async fn create_inbox(
        &self,
        username: &str,
        display_name: &str,
    ) -> Result<Inbox, GatewayError> {
        let response = self
            .authorized(self.client.post(self.url("inboxes")))
            .json(&json!({ "username": username, "display_name": display_name }))
            .send()
            .await?;

        let inbox: Inbox = Self::decode(response).await?;
        debug!(inbox_id = %inbox.id, address = %inbox.email_address, "inbox created");
        Ok(inbox)
    }

    async fn send(
        &self,
        inbox_id: &str,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError> {
        let response = self
            .authorized(self.client.post(self.url(&format!("inboxes/{inbox_id}/messages"))))
            .json(&json!({ "to": to, "subject": subject, "text": text }))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<MessageRef, GatewayError> {
        let response = self
            .authorized(self.client.post(
                self.url(&format!("inboxes/{inbox_id}/messages/{message_id}/reply")),
            ))
            .json(&json!({ "text": text }))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn list(&self, inbox_id: &str) -> Result<Vec<MessageSummary>, GatewayError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("inboxes/{inbox_id}/messages"))))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get(
        &self,
        inbox_id: &str,
        message_id: &str,
    ) -> Result<EmailMessage, GatewayError> {
        let response = self
            .authorized(
                self.client.get(self.url(&format!("inboxes/{inbox_id}/messages/{message_id}"))),
            )
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn register_webhook(&self, inbox_id: &str, url: &str) -> Result<(), GatewayError> {
        let response = self
            .authorized(self.client.put(self.url(&format!("inboxes/{inbox_id}/webhook"))))
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        // 409 means this URL is already registered on the inbox, which is
        // exactly the state we asked for.
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status { status: status.as_u16(), body })
    }
}
