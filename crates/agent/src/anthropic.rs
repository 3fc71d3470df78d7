use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{http_client, LlmClient, LlmError};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Messages API client.
pub struct AnthropicClient {
    base_url: String,
    api_key: SecretString,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [Message { role: "user", content: prompt }],
        };
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|error| LlmError::Transport {
                provider: PROVIDER,
                message: error.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|error| LlmError::Transport {
            provider: PROVIDER,
            message: error.to_string(),
        })?;

        if !status.is_success() {
            return Err(
                LlmError::Status { provider: PROVIDER, status: status.as_u16(), body: text }.into()
            );
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|error| {
            LlmError::Payload { provider: PROVIDER, message: error.to_string() }
        })?;

        let content: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        debug!(
            event_name = "llm.completion.received",
            provider = PROVIDER,
            model = %self.model,
            chars = content.len(),
            "completion received"
        );

        Ok(content)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
