//! Error types for encoding, eligibility and inference

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the encode → gate → predict pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    /// Model artifact absent, unreadable or corrupt at startup
    #[error("Model artifact unavailable at {}: {reason}", path.display())]
    MissingArtifact { path: PathBuf, reason: String },

    /// A raw field is outside its declared domain
    #[error("Invalid input: {field} = {value} is outside [{min}, {max}]")]
    InvalidInput {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Encoded vector and model disagree on feature count or order
    #[error("Feature shape mismatch (expected {expected}, got {actual}): {detail}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        detail: String,
    },

    /// Business-policy rejection, not a system failure
    #[error("Life insurance is not provided for individuals above {max_age}.")]
    IneligibleRequest { age: i32, max_age: i32 },

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictionError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::MissingArtifact { .. } => "missing_artifact",
            PredictionError::InvalidInput { .. } => "invalid_input",
            PredictionError::ShapeMismatch { .. } => "shape_mismatch",
            PredictionError::IneligibleRequest { .. } => "ineligible_request",
            PredictionError::Inference(_) => "inference_failed",
        }
    }

    /// True when the person filling in the form can fix or expect the outcome
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            PredictionError::InvalidInput { .. } | PredictionError::IneligibleRequest { .. }
        )
    }

    /// True for configuration errors that stop the process from serving
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PredictionError::MissingArtifact { .. } | PredictionError::ShapeMismatch { .. }
        )
    }

    pub(crate) fn missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PredictionError::MissingArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = PredictionError> = std::result::Result<T, E>;
