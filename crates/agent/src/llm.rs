use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use omegapick_core::config::{LlmConfig, LlmProvider};
use thiserror::Error;

use crate::anthropic::AnthropicClient;
use crate::openai::OpenAiCompatibleClient;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one prompt and returns the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn provider_name(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model generation is disabled")]
    Disabled,
    #[error("no API key configured for provider `{0}`")]
    MissingApiKey(&'static str),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("{provider} request failed: {message}")]
    Transport { provider: &'static str, message: String },
    #[error("{provider} returned status {status}: {body}")]
    Status { provider: &'static str, status: u16, body: String },
    #[error("{provider} returned an unreadable payload: {message}")]
    Payload { provider: &'static str, message: String },
}

/// Client used when generation is switched off or cannot be configured.
/// Every call fails, which routes each comparison through the fallback.
#[derive(Clone, Debug)]
pub struct DisabledLlm {
    reason: String,
}

impl DisabledLlm {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for DisabledLlm {
    fn default() -> Self {
        Self::new(LlmError::Disabled.to_string())
    }
}

#[async_trait]
impl LlmClient for DisabledLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow::anyhow!(self.reason.clone()))
    }

    fn provider_name(&self) -> &str {
        "disabled"
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|error| LlmError::Client(error.to_string()))
}

/// Builds the client for the configured provider. Missing credentials yield a
/// [`DisabledLlm`] so the service still answers through the fallback path.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    if !config.generation_enabled() {
        let reason = match config.provider {
            LlmProvider::Disabled => LlmError::Disabled,
            _ => LlmError::MissingApiKey(config.provider.as_str()),
        };
        return Ok(Arc::new(DisabledLlm::new(reason.to_string())));
    }

    let base_url = config.effective_base_url().unwrap_or_default();
    match config.provider {
        LlmProvider::OpenAi | LlmProvider::Ollama => Ok(Arc::new(OpenAiCompatibleClient::new(
            config.provider.as_str(),
            base_url,
            config.api_key.clone(),
            config.model.clone(),
            config.timeout_secs,
        )?)),
        LlmProvider::Anthropic => {
            let api_key =
                config.api_key.clone().ok_or(LlmError::MissingApiKey(config.provider.as_str()))?;
            Ok(Arc::new(AnthropicClient::new(
                base_url,
                api_key,
                config.model.clone(),
                config.timeout_secs,
            )?))
        }
        LlmProvider::Disabled => Ok(Arc::new(DisabledLlm::default())),
    }
}

#[cfg(test)]
mod tests {
    use omegapick_core::config::{LlmConfig, LlmProvider};

    use super::{client_from_config, DisabledLlm, LlmClient};

    fn config(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: api_key.map(|key| key.to_string().into()),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn disabled_client_always_fails() {
        let error = DisabledLlm::default().complete("prompt").await.expect_err("disabled");
        assert!(error.to_string().contains("disabled"));
    }

    #[tokio::test]
    async fn missing_key_builds_a_disabled_client_with_reason() {
        let client = client_from_config(&config(LlmProvider::OpenAi, None)).expect("client");

        assert_eq!(client.provider_name(), "disabled");
        let error = client.complete("prompt").await.expect_err("no key");
        assert!(error.to_string().contains("no API key configured for provider `openai`"));
    }

    #[test]
    fn configured_providers_build_http_clients() {
        let openai = client_from_config(&config(LlmProvider::OpenAi, Some("sk-test")))
            .expect("openai client");
        let anthropic = client_from_config(&config(LlmProvider::Anthropic, Some("sk-ant")))
            .expect("anthropic client");
        let ollama = client_from_config(&config(LlmProvider::Ollama, None)).expect("ollama");

        assert_eq!(openai.provider_name(), "openai");
        assert_eq!(anthropic.provider_name(), "anthropic");
        assert_eq!(ollama.provider_name(), "ollama");
    }
}
