//! Age-based eligibility gate, evaluated before the model is consulted

use crate::error::{PredictionError, Result};

/// Oldest age for which a cost is quoted
pub const DEFAULT_MAX_ELIGIBLE_AGE: i32 = 65;

#[derive(Debug, Clone, Copy)]
pub struct EligibilityGate {
    max_age: i32,
}

impl Default for EligibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ELIGIBLE_AGE)
    }
}

impl EligibilityGate {
    pub fn new(max_age: i32) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    pub fn is_eligible(&self, age: i32) -> bool {
        age <= self.max_age
    }

    pub fn check(&self, age: i32) -> Result<()> {
        if self.is_eligible(age) {
            Ok(())
        } else {
            Err(PredictionError::IneligibleRequest {
                age,
                max_age: self.max_age,
            })
        }
    }
}
