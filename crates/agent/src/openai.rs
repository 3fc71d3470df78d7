//! Chat-completions client for OpenAI and OpenAI-compatible servers (Ollama).

use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{http_client, LlmClient, LlmError};

pub struct OpenAiCompatibleClient {
    provider: &'static str,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider: &'static str,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            provider,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            client: http_client(timeout_secs)?,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
        };

        let mut request = self.client.post(self.api_url("chat/completions")).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|error| LlmError::Transport {
            provider: self.provider,
            message: error.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|error| LlmError::Transport {
            provider: self.provider,
            message: error.to_string(),
        })?;

        if !status.is_success() {
            return Err(LlmError::Status {
                provider: self.provider,
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|error| {
            LlmError::Payload { provider: self.provider, message: error.to_string() }
        })?;

        // A missing completion is handed on as empty text and rejected by the normalizer.
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(
            event_name = "llm.completion.received",
            provider = self.provider,
            model = %self.model,
            chars = content.len(),
            "completion received"
        );

        Ok(content)
    }

    fn provider_name(&self) -> &str {
        self.provider
    }
}
