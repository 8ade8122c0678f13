//! ONNX inference using tract
//!
//! Runs an exported regression model (for example a scikit-learn forest
//! converted to ONNX) with a fixed `f32[1, 17]` input.

use super::Regressor;
use crate::error::{PredictionError, Result};
use crate::models::FEATURE_COUNT;
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based regressor backend
pub struct OnnxRegressor {
    model: TractModel,
}

impl OnnxRegressor {
    /// Parse, pin the input shape and optimize an ONNX model.
    ///
    /// Unparseable bytes are a missing artifact; a graph that cannot be
    /// specialized to `[1, 17]` is a shape mismatch.
    pub fn from_bytes(path: &Path, model_bytes: &[u8]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| PredictionError::missing(path, format!("failed to parse ONNX model: {}", e)))?;

        let model = model
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .and_then(|m| m.into_optimized())
            .map_err(|e| PredictionError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: 0,
                detail: format!("model does not accept [1, {}] input: {}", FEATURE_COUNT, e),
            })?
            .into_runnable()
            .map_err(|e| PredictionError::missing(path, format!("failed to create runnable model: {}", e)))?;

        Ok(Self { model })
    }
}

impl Regressor for OnnxRegressor {
    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn infer(&self, features: &[f32]) -> Result<f64> {
        if features.len() != FEATURE_COUNT {
            return Err(PredictionError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
                detail: "onnx input".to_string(),
            });
        }

        let start = Instant::now();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| PredictionError::Inference(format!("failed to build input tensor: {}", e)))?
            .into();

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        let output = result
            .first()
            .ok_or_else(|| PredictionError::Inference("no output from model".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        let value = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| PredictionError::Inference("model output is empty".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(value as f64)
    }
}
