use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use omegapick_agent::ComparisonRuntime;
use omegapick_core::comparison::metrics::DerivedMetrics;
use omegapick_core::domain::comparison::{ComparisonRequest, ComparisonResponse};
use omegapick_core::errors::InterfaceError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::health;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ComparisonRuntime>,
    pub generation_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn malformed_body(rejection: JsonRejection, correlation_id: &str) -> Self {
        info!(
            event_name = "http.compare.rejected",
            correlation_id,
            reason = %rejection.body_text(),
            "request body rejected"
        );
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "request body must be a JSON object with profile, productA, productB"
                    .to_string(),
                detail: Some(rejection.body_text()),
            },
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        match &value {
            InterfaceError::BadRequest { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody { error: value.user_message().to_string(), detail: None },
            },
            InterfaceError::Internal { message, correlation_id } => {
                error!(
                    event_name = "http.compare.failed",
                    correlation_id = %correlation_id,
                    error = %message,
                    "comparison failed"
                );
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: value.user_message().to_string(),
                        detail: Some(message.clone()),
                    },
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<DerivedMetrics>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(banner))
        .route("/products", get(products))
        .route("/compare", post(compare))
        .route("/health", get(health::health))
        .layer(cors)
        .with_state(state)
}

async fn banner() -> &'static str {
    "omegapick server is running"
}

async fn products(State(state): State<AppState>) -> Json<ProductsResponse> {
    Json(ProductsResponse { products: state.runtime.engine().catalog_metrics() })
}

async fn compare(
    State(state): State<AppState>,
    payload: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Result<Json<ComparisonResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) =
        payload.map_err(|rejection| ApiError::malformed_body(rejection, &correlation_id))?;

    let response = state
        .runtime
        .compare(request, &correlation_id)
        .await
        .map_err(|error| ApiError::from(error.into_interface(correlation_id.as_str())))?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use omegapick_agent::{ComparisonRuntime, DisabledLlm, LlmClient};
    use omegapick_core::comparison::catalog::Catalog;
    use omegapick_core::comparison::scoring::{DecisionScorer, ScoringWeights};
    use omegapick_core::comparison::ComparisonEngine;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, AppState};

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn app_with(client: Arc<dyn LlmClient>) -> Router {
        let engine = ComparisonEngine::new(Arc::new(Catalog::builtin()));
        router(AppState {
            runtime: Arc::new(ComparisonRuntime::with_client(engine, client)),
            generation_enabled: true,
        })
    }

    fn fallback_app() -> Router {
        app_with(Arc::new(DisabledLlm::default()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_compare(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/compare")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request builds")
    }

    fn compare_body(first: &str, second: &str) -> String {
        json!({
            "profile": { "age": 34, "gender": "female", "budget": "under $30" },
            "productA": first,
            "productB": second
        })
        .to_string()
    }

    #[tokio::test]
    async fn banner_is_plain_text() {
        let response = fallback_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        assert_eq!(&bytes[..], b"omegapick server is running");
    }

    #[tokio::test]
    async fn products_lists_catalog_metrics() {
        let request = Request::builder().uri("/products").body(Body::empty()).expect("request");
        let (status, body) = send(fallback_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        let products = body["products"].as_array().expect("products array");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["key"], "Sports Research");
        assert!(products[1]["pricePer1000mgOmega3"].is_number());
    }

    #[tokio::test]
    async fn compare_with_model_output_returns_full_contract() {
        let reply = r#"Sure! {"winner":"NOW Foods","reason":"More EPA per dollar.","valueSummary":["v"],"cautions":["c"]}"#;
        let app = app_with(Arc::new(FixedLlm(reply)));
        let (status, body) =
            send(app, post_compare(compare_body("Sports Research", "NOW Foods"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usedFallback"], false);
        assert!(body["openaiError"].is_null());
        assert_eq!(body["gptJson"]["winner"], "NOW Foods");
        assert_eq!(body["gptRaw"], reply);
        assert_eq!(body["winnerFromScoreModel"], "Sports Research");
        assert_eq!(body["profileEcho"]["budget"], "under $30");
        assert!(body["products"]["Sports Research"]["servingsPerBottle"].is_number());
        assert!(body["scores"]["NOW Foods"].is_number());
        assert!(body["betaNotice"].as_str().is_some_and(|notice| notice.starts_with("Beta:")));
    }

    #[tokio::test]
    async fn compare_without_model_falls_back() {
        let (status, body) =
            send(fallback_app(), post_compare(compare_body("NOW Foods", "Sports Research"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usedFallback"], true);
        assert!(body["openaiError"].is_string());
        assert_eq!(body["gptJson"]["winner"], body["winnerFromScoreModel"]);
        assert_eq!(body["gptJson"]["valueSummary"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["gptJson"]["cautions"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn missing_fields_are_a_bad_request() {
        let body = json!({ "profile": { "age": 30, "gender": "male" }, "productA": "NOW Foods" });
        let (status, body) = send(fallback_app(), post_compare(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "profile, productA, productB are required");
    }

    #[tokio::test]
    async fn unknown_product_is_a_bad_request() {
        let (status, body) =
            send(fallback_app(), post_compare(compare_body("Sports Research", "Acme Oil"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid product selection. Only Sports Research & NOW Foods are supported."
        );
        assert!(body.get("products").is_none());
    }

    #[tokio::test]
    async fn non_finite_score_is_an_internal_error() {
        let weights = ScoringWeights { omega3: f64::INFINITY, ..ScoringWeights::default() };
        let engine = ComparisonEngine::with_scorer(
            Arc::new(Catalog::builtin()),
            DecisionScorer::with_weights(weights),
        );
        let app = router(AppState {
            runtime: Arc::new(ComparisonRuntime::with_client(
                engine,
                Arc::new(DisabledLlm::default()),
            )),
            generation_enabled: false,
        });

        let (status, body) =
            send(app, post_compare(compare_body("Sports Research", "NOW Foods"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected internal error occurred.");
        assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()));
        assert!(body.get("usedFallback").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request_with_error_shape() {
        let (status, body) = send(fallback_app(), post_compare("{not json".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn cors_headers_are_present() {
        let request = Request::builder()
            .uri("/products")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .expect("request builds");
        let response = fallback_app().oneshot(request).await.expect("router responds");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }
}
