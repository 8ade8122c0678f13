//! HTTP API for cost prediction, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use medcost_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::{PredictionMetrics, StructuredLogger},
    CostPredictor, PredictionError, Quote, QuoteService, RawInput, FEATURE_NAMES,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: PredictionMetrics,
    pub logger: StructuredLogger,
    pub service: QuoteService<CostPredictor>,
    pub currency_symbol: String,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: PredictionMetrics,
        logger: StructuredLogger,
        service: QuoteService<CostPredictor>,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            service,
            currency_symbol: medcost_lib::predictor::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub quote: Quote,
    /// Cost rendered with the configured currency symbol
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct EncodeResponse {
    pub feature_names: Vec<&'static str>,
    pub values: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub user_fixable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

fn status_for(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::IneligibleRequest { .. } => StatusCode::FORBIDDEN,
        PredictionError::MissingArtifact { .. }
        | PredictionError::ShapeMismatch { .. }
        | PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Record the failure and turn it into a JSON error response
async fn error_response(state: &AppState, err: PredictionError) -> Response {
    match &err {
        PredictionError::InvalidInput { field, value, .. } => {
            state.metrics.inc_invalid_inputs();
            state.logger.log_invalid_input(field, *value);
        }
        PredictionError::IneligibleRequest { age, max_age } => {
            state.metrics.inc_ineligible();
            state.logger.log_ineligible(*age, *max_age);
        }
        other => {
            state.metrics.inc_prediction_errors();
            state.logger.log_prediction_error(other.kind(), &other.to_string());
            if other.is_fatal() {
                state
                    .health_registry
                    .set_unhealthy(components::MODEL, other.to_string())
                    .await;
            }
        }
    }

    let field = match &err {
        PredictionError::InvalidInput { field, .. } => Some(*field),
        _ => None,
    };
    let body = ErrorResponse {
        error: err.kind(),
        message: err.to_string(),
        user_fixable: err.is_user_fixable(),
        field,
    };
    (status_for(&err), Json(body)).into_response()
}

/// Refuse predictions once a fatal model error has been recorded
async fn model_unavailable(state: &AppState) -> Option<Response> {
    let status = state.health_registry.component_status(components::MODEL).await;
    if status != Some(ComponentStatus::Unhealthy) {
        return None;
    }

    let body = ErrorResponse {
        error: "model_unavailable",
        message: "Model is unhealthy; restart with a valid artifact".to_string(),
        user_fixable: false,
        field: None,
    };
    Some((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response())
}

/// Estimate the cost for one form submission
async fn predict(State(state): State<Arc<AppState>>, Json(raw): Json<RawInput>) -> Response {
    if let Some(response) = model_unavailable(&state).await {
        return response;
    }
    let start = Instant::now();

    match state.service.quote(&raw) {
        Ok(quote) => {
            let elapsed = start.elapsed();
            state.metrics.observe_prediction_latency(elapsed.as_secs_f64());
            state.metrics.inc_predictions();
            if !quote.warnings.is_empty() {
                state.logger.log_conditions_normalized();
            }
            state.logger.log_prediction(
                raw.age,
                quote.predicted_cost.amount(),
                &quote.model_version,
                elapsed.as_micros(),
            );

            let display = quote.predicted_cost.display_with(&state.currency_symbol);
            (StatusCode::OK, Json(PredictResponse { quote, display })).into_response()
        }
        Err(err) => error_response(&state, err).await,
    }
}

/// Validate and encode without predicting
async fn encode(State(state): State<Arc<AppState>>, Json(raw): Json<RawInput>) -> Response {
    match state.service.encode(&raw) {
        Ok(vector) => {
            let body = EncodeResponse {
                feature_names: FEATURE_NAMES.to_vec(),
                values: vector.as_slice().to_vec(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(&state, err).await,
    }
}

/// Loaded model description
async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.predictor().info().clone())
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/encode", post(encode))
        .route("/api/v1/model", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
