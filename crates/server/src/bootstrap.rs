use std::sync::Arc;

use omegapick_agent::{client_from_config, ComparisonRuntime, LlmError};
use omegapick_core::comparison::catalog::{Catalog, CatalogError};
use omegapick_core::comparison::ComparisonEngine;
use omegapick_core::config::AppConfig;
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<ComparisonRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),
    #[error("language model client could not be built: {0}")]
    Llm(#[from] LlmError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Catalog::from_config(&config.catalog)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        products = catalog.len(),
        supported = %catalog.supported_list(),
        "product catalog loaded"
    );

    let client = client_from_config(&config.llm)?;
    if config.llm.generation_enabled() {
        info!(
            event_name = "system.bootstrap.llm_configured",
            correlation_id = "bootstrap",
            provider = config.llm.provider.as_str(),
            model = %config.llm.model,
            "language model client configured"
        );
    } else {
        warn!(
            event_name = "system.bootstrap.llm_unavailable",
            correlation_id = "bootstrap",
            provider = config.llm.provider.as_str(),
            "language model generation unavailable, every comparison will use the fallback"
        );
    }

    let engine = ComparisonEngine::new(Arc::new(catalog));
    let runtime = Arc::new(ComparisonRuntime::with_client(engine, client));

    Ok(Application { config, runtime })
}
