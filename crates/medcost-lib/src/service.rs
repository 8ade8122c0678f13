//! Quote service: encode, gate on eligibility, then predict

use crate::error::Result;
use crate::models::{ConditionFlags, EncodedVector, RawInput};
use crate::predictor::{EligibilityGate, FeatureEncoder, PredictedCost, Predictor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Warning attached when "None" was selected alongside real conditions
pub const CONDITION_CONFLICT_WARNING: &str =
    "If 'None' is selected, no other conditions can be selected.";

/// Successful cost estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub predicted_cost: PredictedCost,
    pub model_version: String,
    pub features: EncodedVector,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub generated_at: i64,
}

/// Composes the encoder, eligibility gate and a shared predictor
pub struct QuoteService<P: Predictor> {
    encoder: FeatureEncoder,
    gate: EligibilityGate,
    predictor: Arc<P>,
}

impl<P: Predictor> Clone for QuoteService<P> {
    fn clone(&self) -> Self {
        Self {
            encoder: self.encoder.clone(),
            gate: self.gate,
            predictor: Arc::clone(&self.predictor),
        }
    }
}

impl<P: Predictor> QuoteService<P> {
    pub fn new(predictor: Arc<P>) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            gate: EligibilityGate::default(),
            predictor,
        }
    }

    pub fn with_gate(mut self, gate: EligibilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_encoder(mut self, encoder: FeatureEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    /// Validate and encode without predicting
    pub fn encode(&self, raw: &RawInput) -> Result<EncodedVector> {
        self.encoder.encode(raw)
    }

    /// Full pipeline. Invalid input is reported before eligibility, and an
    /// ineligible request never reaches the predictor.
    pub fn quote(&self, raw: &RawInput) -> Result<Quote> {
        let features = self.encoder.encode(raw)?;
        self.gate.check(raw.age)?;

        let predicted_cost = self.predictor.predict(&features)?;
        debug!(cost = predicted_cost.amount(), "Quote produced");

        let mut warnings = Vec::new();
        if ConditionFlags::has_conflict(&raw.pre_existing_conditions) {
            warnings.push(CONDITION_CONFLICT_WARNING.to_string());
        }

        Ok(Quote {
            predicted_cost,
            model_version: self.predictor.model_version().to_string(),
            features,
            warnings,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }
}
