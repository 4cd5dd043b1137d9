use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;

use mailduet_core::config::{LlmConfig, LlmProvider};

const OPENAI_DEFAULT_BASE: &str = "https://api.openai.com";
const ANTHROPIC_DEFAULT_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_COMPLETION_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation response carried no usable text")]
    EmptyCompletion,
    #[error("generation backend misconfigured: {0}")]
    Misconfigured(String),
}

/// The content-generation seam: one prompt in, one opaque text out.
/// Output is non-deterministic; callers must not assume stability.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// HTTP client for the configured completion backend. One request per
/// call, bounded by the configured timeout, no retries: a failed call
/// fails the delivery attempt that triggered it.
pub struct HttpLlmClient {
    client: Client,
    provider: LlmProvider,
    api_key: Option<SecretString>,
    base_url: Option<String>,
    model: String,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            provider: config.provider,
            api_key: config.api_key.clone(),
            base_url: config.base_url.as_ref().map(|url| url.trim_end_matches('/').to_owned()),
            model: config.model.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| GenerationError::Misconfigured("llm.api_key is not set".to_owned()))
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String, GenerationError> {
        let base = self.base_url.as_deref().unwrap_or(OPENAI_DEFAULT_BASE);
        let response = self
            .client
            .post(format!("{base}/v1/chat/completions"))
            .bearer_auth(self.api_key()?)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await?;

        let value = decode_json(response).await?;
        extract_openai_text(&value).ok_or(GenerationError::EmptyCompletion)
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String, GenerationError> {
        let base = self.base_url.as_deref().unwrap_or(ANTHROPIC_DEFAULT_BASE);
        let response = self
            .client
            .post(format!("{base}/v1/messages"))
            .header("x-api-key", self.api_key()?)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": MAX_COMPLETION_TOKENS,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await?;

        let value = decode_json(response).await?;
        extract_anthropic_text(&value).ok_or(GenerationError::EmptyCompletion)
    }

    async fn complete_ollama(&self, prompt: &str) -> Result<String, GenerationError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            GenerationError::Misconfigured("llm.base_url is required for ollama".to_owned())
        })?;
        let response = self
            .client
            .post(format!("{base}/api/generate"))
            .json(&json!({ "model": self.model, "prompt": prompt, "stream": false }))
            .send()
            .await?;

        let value = decode_json(response).await?;
        extract_ollama_text(&value).ok_or(GenerationError::EmptyCompletion)
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        match self.provider {
            LlmProvider::OpenAi => self.complete_openai(prompt).await,
            LlmProvider::Anthropic => self.complete_anthropic(prompt).await,
            LlmProvider::Ollama => self.complete_ollama(prompt).await,
        }
    }
}

async fn decode_json(response: reqwest::Response) -> Result<Value, GenerationError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GenerationError::Status { status: status.as_u16(), body });
    }
    serde_json::from_str(&body).map_err(|_| GenerationError::EmptyCompletion)
}

fn extract_openai_text(value: &Value) -> Option<String> {
    non_empty(value.get("choices")?.get(0)?.get("message")?.get("content")?.as_str()?)
}

fn extract_anthropic_text(value: &Value) -> Option<String> {
    non_empty(value.get("content")?.get(0)?.get("text")?.as_str()?)
}

fn extract_ollama_text(value: &Value) -> Option<String> {
    non_empty(value.get("response")?.as_str()?)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Fixed-output client for tests and offline runs.
pub struct StaticLlmClient {
    text: String,
}

impl StaticLlmClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl LlmClient for StaticLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        extract_anthropic_text, extract_ollama_text, extract_openai_text, LlmClient,
        StaticLlmClient,
    };

    #[test]
    fn openai_completion_text_is_extracted() {
        let value = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello Sam," } }]
        });
        assert_eq!(extract_openai_text(&value).as_deref(), Some("Hello Sam,"));
    }

    #[test]
    fn anthropic_completion_text_is_extracted() {
        let value = json!({ "content": [{ "type": "text", "text": "Hello Ava," }] });
        assert_eq!(extract_anthropic_text(&value).as_deref(), Some("Hello Ava,"));
    }

    #[test]
    fn ollama_completion_text_is_extracted() {
        let value = json!({ "model": "llama3.1", "response": "Sure, Tuesday works." });
        assert_eq!(extract_ollama_text(&value).as_deref(), Some("Sure, Tuesday works."));
    }

    #[test]
    fn blank_completions_are_treated_as_missing() {
        let value = json!({ "response": "   " });
        assert_eq!(extract_ollama_text(&value), None);
        let value = json!({ "choices": [] });
        assert_eq!(extract_openai_text(&value), None);
    }

    #[tokio::test]
    async fn static_client_echoes_its_fixture() {
        let client = StaticLlmClient::new("canned reply");
        let text = client.complete("whatever prompt").await.expect("complete");
        assert_eq!(text, "canned reply");
    }
}
