use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub generation: HealthCheck,
    pub checked_at: String,
}

/// Always 200: a missing language model only means comparisons use the fallback.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = state.runtime.engine().catalog();
    let generation = if state.generation_enabled {
        HealthCheck {
            status: "ready",
            detail: format!("provider `{}` configured", state.runtime.producer_name()),
        }
    } else {
        HealthCheck {
            status: "fallback_only",
            detail: "no language model configured, deterministic recommendations only"
                .to_string(),
        }
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "omegapick-server runtime initialized".to_string(),
        },
        catalog: HealthCheck {
            status: "ready",
            detail: format!("{} products: {}", catalog.len(), catalog.supported_list()),
        },
        generation,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
