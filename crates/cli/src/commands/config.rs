use std::env;
use std::fs;
use std::path::Path;

use omegapick_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let api_key = match &config.llm.api_key {
        Some(key) => redact_key(key.expose_secret()),
        None => "<unset>".to_string(),
    };
    let catalog_path = config
        .catalog
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    let generation = if config.llm.generation_enabled() { "enabled" } else { "fallback only" };

    let fields: [(&str, String, &[&str]); 12] = [
        ("llm.provider", config.llm.provider.as_str().to_string(), &["OMEGAPICK_LLM_PROVIDER"]),
        ("llm.model", config.llm.model.clone(), &["OMEGAPICK_LLM_MODEL"]),
        (
            "llm.base_url",
            config.llm.effective_base_url().unwrap_or_else(|| "<unset>".to_string()),
            &["OMEGAPICK_LLM_BASE_URL"],
        ),
        ("llm.api_key", api_key, &["OMEGAPICK_LLM_API_KEY", "OPENAI_API_KEY"]),
        (
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["OMEGAPICK_LLM_TIMEOUT_SECS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["OMEGAPICK_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["OMEGAPICK_SERVER_PORT", "PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["OMEGAPICK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("catalog.path", catalog_path, &["OMEGAPICK_CATALOG_PATH"]),
        (
            "logging.level",
            config.logging.level.clone(),
            &["OMEGAPICK_LOGGING_LEVEL", "OMEGAPICK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["OMEGAPICK_LOGGING_FORMAT", "OMEGAPICK_LOG_FORMAT"],
        ),
        ("llm.generation", generation.to_string(), &[]),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    if env_keys.is_empty() {
        return "derived".to_string();
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
