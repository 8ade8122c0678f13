//! Prediction output post-processing
//!
//! Converts the raw regression output into a [`PredictedCost`]: rounded to
//! two decimal places and never negative.

use crate::error::{PredictionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Default currency symbol used when rendering costs
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Round half away from zero to two decimal places
///
/// Exact ties differ from banker's rounding by one cent: 0.125 becomes
/// 0.13, not 0.12.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimated cost, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictedCost(f64);

impl PredictedCost {
    /// Post-process a raw model output.
    ///
    /// Non-finite outputs are an inference failure. Negative outputs clamp
    /// to zero.
    pub fn from_raw(raw: f64) -> Result<Self> {
        if !raw.is_finite() {
            return Err(PredictionError::Inference(format!(
                "model produced non-finite output {}",
                raw
            )));
        }
        if raw < 0.0 {
            warn!(raw_output = raw, "Model produced negative cost, clamping to 0");
            return Ok(Self(0.0));
        }
        Ok(Self(round_to_cents(raw)))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Render with a currency symbol, e.g. `₹4966.67`
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{}{:.2}", symbol, self.0)
    }
}

impl fmt::Display for PredictedCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_to_two_places() {
        assert_eq!(PredictedCost::from_raw(14900.0 / 3.0).unwrap().amount(), 4966.67);
        assert_eq!(PredictedCost::from_raw(1234.5).unwrap().amount(), 1234.5);
        assert_eq!(PredictedCost::from_raw(10.004).unwrap().amount(), 10.0);
    }

    #[test]
    fn test_exact_tie_rounds_away_from_zero() {
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(2.5), 2.5);
    }

    #[test]
    fn test_negative_output_clamped() {
        let cost = PredictedCost::from_raw(-42.0).unwrap();
        assert_eq!(cost.amount(), 0.0);
    }

    #[test]
    fn test_non_finite_output_rejected() {
        assert!(matches!(
            PredictedCost::from_raw(f64::NAN),
            Err(PredictionError::Inference(_))
        ));
        assert!(PredictedCost::from_raw(f64::INFINITY).is_err());
    }

    #[test]
    fn test_display() {
        let cost = PredictedCost::from_raw(4966.666).unwrap();
        assert_eq!(cost.to_string(), "4966.67");
        assert_eq!(cost.display_with(DEFAULT_CURRENCY_SYMBOL), "₹4966.67");
        assert_eq!(serde_json::to_string(&cost).unwrap(), "4966.67");
    }
}
