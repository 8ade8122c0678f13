//! Feature encoding for regression inference
//!
//! Turns a validated [`RawInput`] into the fixed-order [`EncodedVector`].
//! Every numeric field is checked against its domain here; callers are not
//! trusted to have clamped anything.

use crate::error::{PredictionError, Result};
use crate::models::{EncodedVector, RawInput, FEATURE_COUNT};
use std::ops::RangeInclusive;

/// Inclusive domains for the numeric form fields
#[derive(Debug, Clone)]
pub struct InputBounds {
    pub age: RangeInclusive<i32>,
    pub bmi: RangeInclusive<f32>,
    pub children: RangeInclusive<i32>,
    pub exercise_frequency: RangeInclusive<i32>,
    pub sleep_hours: RangeInclusive<i32>,
    pub stress_level: RangeInclusive<i32>,
    pub water_intake: RangeInclusive<f32>,
    pub screen_time: RangeInclusive<f32>,
    pub health_checkups: RangeInclusive<i32>,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            age: 18..=100,
            bmi: 10.0..=50.0,
            children: 0..=10,
            exercise_frequency: 0..=7,
            sleep_hours: 3..=12,
            stress_level: 1..=10,
            water_intake: 0.5..=5.0,
            screen_time: 1.0..=16.0,
            health_checkups: 0..=12,
        }
    }
}

fn check_int(field: &'static str, value: i32, range: &RangeInclusive<i32>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(PredictionError::InvalidInput {
        field,
        value: value as f64,
        min: *range.start() as f64,
        max: *range.end() as f64,
    })
}

// NaN and infinities fail `contains`, so they are rejected too.
fn check_float(field: &'static str, value: f32, range: &RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(PredictionError::InvalidInput {
        field,
        value: value as f64,
        min: *range.start() as f64,
        max: *range.end() as f64,
    })
}

fn flag(set: bool) -> f32 {
    if set {
        1.0
    } else {
        0.0
    }
}

/// Encodes raw form input into model features
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    bounds: InputBounds,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: InputBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &InputBounds {
        &self.bounds
    }

    /// Check every numeric field against its domain, in column order
    pub fn validate(&self, raw: &RawInput) -> Result<()> {
        let b = &self.bounds;
        check_int("age", raw.age, &b.age)?;
        check_float("bmi", raw.bmi, &b.bmi)?;
        check_int("children", raw.children, &b.children)?;
        check_int("exercise_frequency", raw.exercise_frequency, &b.exercise_frequency)?;
        check_int("sleep_hours", raw.sleep_hours, &b.sleep_hours)?;
        check_int("stress_level", raw.stress_level, &b.stress_level)?;
        check_float("water_intake", raw.water_intake, &b.water_intake)?;
        check_float("screen_time", raw.screen_time, &b.screen_time)?;
        check_int("health_checkups", raw.health_checkups, &b.health_checkups)?;
        Ok(())
    }

    /// Validate and encode. Pure: same input, same vector.
    pub fn encode(&self, raw: &RawInput) -> Result<EncodedVector> {
        self.validate(raw)?;

        let conditions = raw.condition_flags();
        let values: [f32; FEATURE_COUNT] = [
            raw.age as f32,
            raw.sex.code() as f32,
            raw.bmi,
            raw.children as f32,
            raw.smoker.code() as f32,
            raw.region.code() as f32,
            raw.exercise_frequency as f32,
            raw.diet_type.code() as f32,
            raw.alcohol_consumption.code() as f32,
            flag(conditions.diabetes),
            flag(conditions.heart_disease),
            flag(conditions.hypertension),
            raw.sleep_hours as f32,
            raw.stress_level as f32,
            raw.water_intake,
            raw.screen_time,
            raw.health_checkups as f32,
        ];
        Ok(EncodedVector::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, DietType, Region, Sex, YesNo, FEATURE_NAMES};

    fn reference_input() -> RawInput {
        RawInput {
            age: 30,
            sex: Sex::Male,
            bmi: 25.0,
            children: 1,
            smoker: YesNo::No,
            region: Region::NorthEast,
            exercise_frequency: 3,
            diet_type: DietType::Balanced,
            alcohol_consumption: YesNo::No,
            pre_existing_conditions: vec![Condition::None],
            sleep_hours: 7,
            stress_level: 5,
            water_intake: 2.0,
            screen_time: 6.0,
            health_checkups: 2,
        }
    }

    #[test]
    fn test_reference_encoding() {
        let v = FeatureEncoder::new().encode(&reference_input()).unwrap();
        assert_eq!(
            v.as_slice(),
            &[30.0, 1.0, 25.0, 1.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 7.0, 5.0, 2.0, 6.0, 2.0]
        );
    }

    #[test]
    fn test_vector_length_and_order() {
        let raw = reference_input();
        let v = FeatureEncoder::new().encode(&raw).unwrap();
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES[9], "diabetes");
        assert_eq!(FEATURE_NAMES[10], "heart_disease");
        assert_eq!(FEATURE_NAMES[11], "hypertension");
        assert_eq!(v.get("sleep_hours"), Some(7.0));
        assert_eq!(v.get("health_checkups"), Some(2.0));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let encoder = FeatureEncoder::new();
        let raw = reference_input();
        let first = encoder.encode(&raw).unwrap();
        let second = encoder.encode(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw, reference_input(), "input must not be mutated");
    }

    #[test]
    fn test_category_mapping() {
        let raw = RawInput {
            sex: Sex::Male,
            smoker: YesNo::Yes,
            region: Region::SouthWest,
            diet_type: DietType::Vegan,
            alcohol_consumption: YesNo::Yes,
            ..reference_input()
        };
        let v = FeatureEncoder::new().encode(&raw).unwrap();
        let s = v.as_slice();
        assert_eq!(s[1], 1.0);
        assert_eq!(s[4], 1.0);
        assert_eq!(s[5], 3.0);
        assert_eq!(s[7], 3.0);
        assert_eq!(s[8], 1.0);
    }

    #[test]
    fn test_condition_flags_positions() {
        let raw = RawInput {
            pre_existing_conditions: vec![Condition::Hypertension, Condition::Diabetes],
            ..reference_input()
        };
        let v = FeatureEncoder::new().encode(&raw).unwrap();
        assert_eq!(v.get("diabetes"), Some(1.0));
        assert_eq!(v.get("heart_disease"), Some(0.0));
        assert_eq!(v.get("hypertension"), Some(1.0));
    }

    #[test]
    fn test_none_conflict_normalizes_to_zero_flags() {
        let raw = RawInput {
            pre_existing_conditions: vec![Condition::None, Condition::Diabetes],
            ..reference_input()
        };
        let v = FeatureEncoder::new().encode(&raw).unwrap();
        assert_eq!(&v.as_slice()[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        let encoder = FeatureEncoder::new();
        let cases: Vec<(&str, RawInput)> = vec![
            ("age", RawInput { age: 17, ..reference_input() }),
            ("age", RawInput { age: 101, ..reference_input() }),
            ("bmi", RawInput { bmi: 9.9, ..reference_input() }),
            ("children", RawInput { children: -1, ..reference_input() }),
            ("exercise_frequency", RawInput { exercise_frequency: 8, ..reference_input() }),
            ("sleep_hours", RawInput { sleep_hours: 2, ..reference_input() }),
            ("stress_level", RawInput { stress_level: 0, ..reference_input() }),
            ("water_intake", RawInput { water_intake: 5.5, ..reference_input() }),
            ("screen_time", RawInput { screen_time: 0.5, ..reference_input() }),
            ("health_checkups", RawInput { health_checkups: 13, ..reference_input() }),
        ];

        for (expected_field, raw) in cases {
            match encoder.encode(&raw) {
                Err(PredictionError::InvalidInput { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("expected InvalidInput for {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let raw = RawInput {
            bmi: f32::NAN,
            ..reference_input()
        };
        assert!(matches!(
            FeatureEncoder::new().encode(&raw),
            Err(PredictionError::InvalidInput { field: "bmi", .. })
        ));
    }

    #[test]
    fn test_domain_edges_accepted() {
        let raw = RawInput {
            age: 100,
            bmi: 50.0,
            children: 10,
            exercise_frequency: 0,
            sleep_hours: 12,
            stress_level: 1,
            water_intake: 0.5,
            screen_time: 16.0,
            health_checkups: 0,
            ..reference_input()
        };
        assert!(FeatureEncoder::new().encode(&raw).is_ok());
    }
}
