//! Core library for medical insurance cost estimation
//!
//! This crate provides:
//! - Validation and fixed-order feature encoding of form input
//! - The age eligibility gate
//! - Load-once regression inference (ONNX via tract, or JSON forests)
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;

pub use error::PredictionError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PredictionMetrics, StructuredLogger};
pub use predictor::{
    CostPredictor, EligibilityGate, FeatureEncoder, ModelConfig, ModelFormat, ModelInfo,
    PredictedCost, Predictor,
};
pub use service::{Quote, QuoteService, CONDITION_CONFLICT_WARNING};
