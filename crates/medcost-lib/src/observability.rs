//! Observability for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcome counters, model info)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, GaugeVec, Histogram, IntCounter,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for end-to-end quote latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
];

static GLOBAL_METRICS: OnceLock<PredictionMetricsInner> = OnceLock::new();

struct PredictionMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    ineligible_requests_total: IntCounter,
    invalid_inputs_total: IntCounter,
    prediction_errors_total: IntCounter,
    model_info: GaugeVec,
}

impl PredictionMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "medcost_prediction_latency_seconds",
                "Time spent encoding and running regression inference",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "medcost_predictions_total",
                "Total number of cost estimates produced"
            )
            .expect("Failed to register predictions_total"),

            ineligible_requests_total: register_int_counter!(
                "medcost_ineligible_requests_total",
                "Requests rejected by the age eligibility gate"
            )
            .expect("Failed to register ineligible_requests_total"),

            invalid_inputs_total: register_int_counter!(
                "medcost_invalid_inputs_total",
                "Requests rejected because a field was outside its domain"
            )
            .expect("Failed to register invalid_inputs_total"),

            prediction_errors_total: register_int_counter!(
                "medcost_prediction_errors_total",
                "System-level prediction failures (shape, inference)"
            )
            .expect("Failed to register prediction_errors_total"),

            model_info: register_gauge_vec!(
                "medcost_model_info",
                "Information about the loaded regression model",
                &["version", "backend"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide prediction metrics.
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct PredictionMetrics {
    _private: (),
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictionMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictionMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictionMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_ineligible(&self) {
        self.inner().ineligible_requests_total.inc();
    }

    pub fn inc_invalid_inputs(&self) {
        self.inner().invalid_inputs_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn set_model_info(&self, version: &str, backend: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, backend])
            .set(1.0);
    }

    pub fn predictions_count(&self) -> u64 {
        self.inner().predictions_total.get()
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_version: &str, port: u16) {
        info!(
            event = "server_started",
            instance = %self.instance,
            server_version = %version,
            model_version = %model_version,
            port = port,
            "Cost prediction server started"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, backend: &str, sha256: &str) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_version = %model_version,
            backend = %backend,
            sha256 = %sha256,
            "Regression model loaded"
        );
    }

    pub fn log_model_load_failed(&self, path: &str, reason: &str) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            path = %path,
            reason = %reason,
            "Regression model could not be loaded, refusing to serve"
        );
    }

    pub fn log_prediction(&self, age: i32, cost: f64, model_version: &str, elapsed_us: u128) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            age = age,
            predicted_cost = cost,
            model_version = %model_version,
            elapsed_us = elapsed_us as u64,
            "Generated cost estimate"
        );
    }

    pub fn log_ineligible(&self, age: i32, max_age: i32) {
        info!(
            event = "request_ineligible",
            instance = %self.instance,
            age = age,
            max_age = max_age,
            "Request rejected by eligibility gate"
        );
    }

    pub fn log_invalid_input(&self, field: &str, value: f64) {
        info!(
            event = "input_rejected",
            instance = %self.instance,
            field = %field,
            value = value,
            "Input outside its domain"
        );
    }

    pub fn log_conditions_normalized(&self) {
        warn!(
            event = "conditions_normalized",
            instance = %self.instance,
            "'None' selected with other conditions; treating as 'None' only"
        );
    }

    pub fn log_prediction_error(&self, kind: &str, detail: &str) {
        error!(
            event = "prediction_failed",
            instance = %self.instance,
            kind = %kind,
            detail = %detail,
            "Prediction failed"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Cost prediction server shutting down"
        );
    }
}
