//! Cost prediction engine

mod eligibility;
mod features;
mod forest;
mod inference;
mod output;

pub use eligibility::{EligibilityGate, DEFAULT_MAX_ELIGIBLE_AGE};
pub use features::{FeatureEncoder, InputBounds};
pub use forest::{ForestModel, ForestRegressor, RegressionTree, TreeNode};
pub use inference::OnnxRegressor;
pub use output::{round_to_cents, PredictedCost, DEFAULT_CURRENCY_SYMBOL};

use crate::error::{PredictionError, Result};
use crate::models::{EncodedVector, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Single-sample regression backend
pub trait Regressor: Send + Sync {
    /// Backend identifier used in logs and model info
    fn backend(&self) -> &'static str;

    /// Number of input columns the model was trained on
    fn n_features(&self) -> usize;

    /// Training column names, when the artifact records them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Run inference on one sample and return the first output
    fn infer(&self, features: &[f32]) -> Result<f64>;
}

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Estimate the cost for an encoded vector
    fn predict(&self, vector: &EncodedVector) -> Result<PredictedCost>;

    /// Version of the loaded model
    fn model_version(&self) -> &str;
}

/// Serialized model formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Forest,
}

impl ModelFormat {
    /// Infer the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::Forest),
            _ => None,
        }
    }
}

/// Where and how to load the model artifact
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Explicit format; inferred from the extension when absent
    pub format: Option<ModelFormat>,
    /// Expected SHA-256 of the artifact bytes (hex)
    pub expected_sha256: Option<String>,
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            expected_sha256: None,
        }
    }

    pub fn with_checksum(mut self, sha256_hex: impl Into<String>) -> Self {
        self.expected_sha256 = Some(sha256_hex.into());
        self
    }

    pub fn with_format(mut self, format: ModelFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Description of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub version: String,
    pub backend: String,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub sha256: String,
    pub path: String,
}

/// Loaded, immutable cost predictor.
///
/// The only way to obtain one is [`CostPredictor::load`]; a value of this
/// type always holds a model that passed the shape checks.
pub struct CostPredictor {
    regressor: Box<dyn Regressor>,
    info: ModelInfo,
}

impl std::fmt::Debug for CostPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostPredictor").field("info", &self.info).finish()
    }
}

impl CostPredictor {
    /// Read, verify and load the model artifact
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let path = config.path.as_path();
        let bytes = std::fs::read(path).map_err(|e| PredictionError::missing(path, e.to_string()))?;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        if let Some(expected) = &config.expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(PredictionError::missing(
                    path,
                    format!("checksum mismatch: expected {}, got {}", expected, sha256),
                ));
            }
        }

        let format = config
            .format
            .or_else(|| ModelFormat::from_path(path))
            .ok_or_else(|| PredictionError::missing(path, "unrecognized model format"))?;

        let (regressor, version): (Box<dyn Regressor>, String) = match format {
            ModelFormat::Onnx => (
                Box::new(OnnxRegressor::from_bytes(path, &bytes)?) as Box<dyn Regressor>,
                format!("onnx-{}", &sha256[..12]),
            ),
            ModelFormat::Forest => {
                let model = ForestModel::from_json(&bytes).map_err(|e| PredictionError::missing(path, e))?;
                let version = model.version.clone();
                (Box::new(ForestRegressor::new(model)) as Box<dyn Regressor>, version)
            }
        };

        Self::from_regressor(regressor, version, sha256, path)
    }

    /// Wrap an already-constructed backend, applying the same shape checks
    /// as [`CostPredictor::load`]
    pub fn from_regressor(
        regressor: Box<dyn Regressor>,
        version: impl Into<String>,
        sha256: impl Into<String>,
        path: &Path,
    ) -> Result<Self> {
        check_model_shape(regressor.as_ref())?;

        let info = ModelInfo {
            version: version.into(),
            backend: regressor.backend().to_string(),
            n_features: regressor.n_features(),
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            sha256: sha256.into(),
            path: path.display().to_string(),
        };

        info!(
            version = %info.version,
            backend = %info.backend,
            path = %info.path,
            "Model loaded"
        );
        Ok(Self { regressor, info })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

/// Verify the model consumes exactly the encoder's columns in order
fn check_model_shape(regressor: &dyn Regressor) -> Result<()> {
    let n = regressor.n_features();
    if n != FEATURE_COUNT {
        return Err(PredictionError::ShapeMismatch {
            expected: FEATURE_COUNT,
            actual: n,
            detail: "model feature count".to_string(),
        });
    }

    if let Some(names) = regressor.feature_names() {
        if names.len() != FEATURE_COUNT {
            return Err(PredictionError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: names.len(),
                detail: "model feature names".to_string(),
            });
        }
        if let Some((pos, (got, want))) = names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .enumerate()
            .find(|(_, (got, want))| got.as_str() != **want)
        {
            return Err(PredictionError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: n,
                detail: format!("column {} is '{}', expected '{}'", pos, got, want),
            });
        }
    }
    Ok(())
}

impl Predictor for CostPredictor {
    fn predict(&self, vector: &EncodedVector) -> Result<PredictedCost> {
        if vector.len() != self.info.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.info.n_features,
                actual: vector.len(),
                detail: "encoded vector length".to_string(),
            });
        }

        let start = Instant::now();
        let raw = self.regressor.infer(vector.as_slice())?;
        debug!(
            raw_output = raw,
            elapsed_us = start.elapsed().as_micros(),
            "Regression inference finished"
        );
        PredictedCost::from_raw(raw)
    }

    fn model_version(&self) -> &str {
        &self.info.version
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::demo_forest_json;
    use super::*;
    use crate::models::RawInput;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_model(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_artifact_fails_fast() {
        let err = CostPredictor::load(&ModelConfig::new("/nonexistent/insurance_model.onnx")).unwrap_err();
        assert!(matches!(err, PredictionError::MissingArtifact { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_corrupt_forest_is_missing_artifact() {
        let file = write_model("{ not a forest", ".json");
        let err = CostPredictor::load(&ModelConfig::new(file.path())).unwrap_err();
        assert!(matches!(err, PredictionError::MissingArtifact { .. }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = write_model(&demo_forest_json(false), ".pkl");
        let err = CostPredictor::load(&ModelConfig::new(file.path())).unwrap_err();
        assert!(err.to_string().contains("unrecognized model format"));

        let loaded = CostPredictor::load(&ModelConfig::new(file.path()).with_format(ModelFormat::Forest));
        assert!(loaded.is_ok());
    }

    #[test]
    fn test_checksum_pinning() {
        let json = demo_forest_json(false);
        let file = write_model(&json, ".json");
        let digest = hex::encode(Sha256::digest(json.as_bytes()));

        let ok = CostPredictor::load(&ModelConfig::new(file.path()).with_checksum(digest.to_uppercase())).unwrap();
        assert_eq!(ok.info().sha256, digest);

        let err = CostPredictor::load(&ModelConfig::new(file.path()).with_checksum("00ff")).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_feature_count_mismatch_is_shape_error() {
        let json = demo_forest_json(false).replace("\"n_features\": 17", "\"n_features\": 20");
        let file = write_model(&json, ".json");
        let err = CostPredictor::load(&ModelConfig::new(file.path())).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::ShapeMismatch { expected: 17, actual: 20, .. }
        ));
    }

    #[test]
    fn test_feature_order_mismatch_is_shape_error() {
        let json = demo_forest_json(true).replace(
            "\"diabetes\", \"heart_disease\"",
            "\"heart_disease\", \"diabetes\"",
        );
        let file = write_model(&json, ".json");
        let err = CostPredictor::load(&ModelConfig::new(file.path())).unwrap_err();
        match err {
            PredictionError::ShapeMismatch { detail, .. } => assert!(detail.contains("column 9")),
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_prediction_is_deterministic() {
        let file = write_model(&demo_forest_json(true), ".json");
        let predictor = CostPredictor::load(&ModelConfig::new(file.path())).unwrap();
        assert_eq!(predictor.model_version(), "forest-test-1");
        assert_eq!(predictor.info().backend, "forest-json");

        let raw = RawInput {
            sex: crate::models::Sex::Male,
            ..RawInput::default()
        };
        let vector = FeatureEncoder::new().encode(&raw).unwrap();
        let first = predictor.predict(&vector).unwrap();
        let second = predictor.predict(&vector).unwrap();
        assert_eq!(first, second);
        // (4200 + 5100 + 5600) / 3
        assert_eq!(first.amount(), 4966.67);
    }

    #[test]
    fn test_from_slice_vector_predicts() {
        let file = write_model(&demo_forest_json(false), ".json");
        let predictor = CostPredictor::load(&ModelConfig::new(file.path())).unwrap();
        let mut values = [0.0f32; FEATURE_COUNT];
        values[0] = 60.0; // age
        values[4] = 1.0; // smoker
        values[2] = 35.0; // bmi
        values[9] = 1.0; // diabetes
        let vector = EncodedVector::from_slice(&values).unwrap();
        // (38000 + 13900 + 12800) / 3
        assert_eq!(predictor.predict(&vector).unwrap().amount(), 21566.67);
    }
}
