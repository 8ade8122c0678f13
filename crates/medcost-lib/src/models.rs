//! Core data models for cost estimation
//!
//! Categorical fields are closed enums; each carries the integer code the
//! regression model was trained with. Changing a code or reordering a
//! variant breaks compatibility with every trained artifact.

use crate::error::PredictionError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of features the regression model consumes
pub const FEATURE_COUNT: usize = 17;

/// Training-time column order of the encoded vector
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "sex",
    "bmi",
    "children",
    "smoker",
    "region",
    "exercise_frequency",
    "diet_type",
    "alcohol_consumption",
    "diabetes",
    "heart_disease",
    "hypertension",
    "sleep_hours",
    "stress_level",
    "water_intake",
    "screen_time",
    "health_checkups",
];

/// Lowercases and strips separators so "High-Protein", "high_protein" and
/// "HIGH PROTEIN" compare equal
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown_label(field: &str, value: &str, allowed: &[&str]) -> String {
    format!(
        "unknown {} '{}' (expected one of: {})",
        field,
        value,
        allowed.join(", ")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    pub const fn code(self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

/// Shared No/Yes answer used by `smoker` and `alcohol_consumption`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YesNo {
    #[default]
    No,
    Yes,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::No, YesNo::Yes];

    pub const fn code(self) -> u8 {
        match self {
            YesNo::No => 0,
            YesNo::Yes => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::NorthEast,
        Region::NorthWest,
        Region::SouthEast,
        Region::SouthWest,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Region::NorthEast => 0,
            Region::NorthWest => 1,
            Region::SouthEast => 2,
            Region::SouthWest => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Region::NorthEast => "NorthEast",
            Region::NorthWest => "NorthWest",
            Region::SouthEast => "SouthEast",
            Region::SouthWest => "SouthWest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DietType {
    #[default]
    Balanced,
    HighProtein,
    FastFood,
    Vegan,
}

impl DietType {
    pub const ALL: [DietType; 4] = [
        DietType::Balanced,
        DietType::HighProtein,
        DietType::FastFood,
        DietType::Vegan,
    ];

    pub const fn code(self) -> u8 {
        match self {
            DietType::Balanced => 0,
            DietType::HighProtein => 1,
            DietType::FastFood => 2,
            DietType::Vegan => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DietType::Balanced => "Balanced",
            DietType::HighProtein => "High-Protein",
            DietType::FastFood => "Fast-Food",
            DietType::Vegan => "Vegan",
        }
    }
}

/// One entry of the pre-existing conditions selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Diabetes,
    Hypertension,
    HeartDisease,
    None,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Diabetes,
        Condition::Hypertension,
        Condition::HeartDisease,
        Condition::None,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Condition::Diabetes => "Diabetes",
            Condition::Hypertension => "Hypertension",
            Condition::HeartDisease => "Heart Disease",
            Condition::None => "None",
        }
    }
}

macro_rules! label_traits {
    ($($ty:ident => $field:literal),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = normalize_label(s);
                    $ty::ALL
                        .into_iter()
                        .find(|v| normalize_label(v.label()) == wanted)
                        .ok_or_else(|| {
                            let allowed: Vec<&str> = $ty::ALL.iter().map(|v| v.label()).collect();
                            unknown_label($field, s, &allowed)
                        })
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.label())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let label = String::deserialize(deserializer)?;
                    label.parse().map_err(de::Error::custom)
                }
            }
        )*
    };
}

label_traits! {
    Sex => "sex",
    YesNo => "answer",
    Region => "region",
    DietType => "diet type",
    Condition => "condition",
}

/// Binary condition flags after conflict normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionFlags {
    pub diabetes: bool,
    pub heart_disease: bool,
    pub hypertension: bool,
}

impl ConditionFlags {
    /// Derive flags from a selection. `None` anywhere in the selection wins
    /// and discards the other entries.
    pub fn from_selection(selection: &[Condition]) -> Self {
        if selection.contains(&Condition::None) {
            return Self::default();
        }
        Self {
            diabetes: selection.contains(&Condition::Diabetes),
            heart_disease: selection.contains(&Condition::HeartDisease),
            hypertension: selection.contains(&Condition::Hypertension),
        }
    }

    /// True when `None` was selected together with a real condition
    pub fn has_conflict(selection: &[Condition]) -> bool {
        selection.contains(&Condition::None) && selection.iter().any(|c| *c != Condition::None)
    }
}

/// One prediction request as entered on the form
///
/// Every field is required when decoding; `Default` is the initial form
/// state used by the CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInput {
    pub age: i32,
    pub sex: Sex,
    pub bmi: f32,
    pub children: i32,
    pub smoker: YesNo,
    pub region: Region,
    pub exercise_frequency: i32,
    pub diet_type: DietType,
    pub alcohol_consumption: YesNo,
    pub pre_existing_conditions: Vec<Condition>,
    pub sleep_hours: i32,
    pub stress_level: i32,
    pub water_intake: f32,
    pub screen_time: f32,
    pub health_checkups: i32,
}

impl Default for RawInput {
    /// Initial state of the prediction form
    fn default() -> Self {
        Self {
            age: 30,
            sex: Sex::Female,
            bmi: 25.0,
            children: 1,
            smoker: YesNo::No,
            region: Region::NorthEast,
            exercise_frequency: 3,
            diet_type: DietType::Balanced,
            alcohol_consumption: YesNo::No,
            pre_existing_conditions: Vec::new(),
            sleep_hours: 7,
            stress_level: 5,
            water_intake: 2.0,
            screen_time: 6.0,
            health_checkups: 2,
        }
    }
}

impl RawInput {
    pub fn condition_flags(&self) -> ConditionFlags {
        ConditionFlags::from_selection(&self.pre_existing_conditions)
    }
}

/// Fixed-order numeric features fed to the regression model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodedVector {
    values: [f32; FEATURE_COUNT],
}

impl EncodedVector {
    pub(crate) fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from an externally produced slice; the length must match
    /// the model's column count exactly
    pub fn from_slice(values: &[f32]) -> Result<Self, PredictionError> {
        let values: [f32; FEATURE_COUNT] =
            values
                .try_into()
                .map_err(|_| PredictionError::ShapeMismatch {
                    expected: FEATURE_COUNT,
                    actual: values.len(),
                    detail: "encoded vector length".to_string(),
                })?;
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a feature by its training column name
    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    /// (name, value) pairs in column order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_tables() {
        assert_eq!(Sex::Female.code(), 0);
        assert_eq!(Sex::Male.code(), 1);
        assert_eq!(YesNo::No.code(), 0);
        assert_eq!(YesNo::Yes.code(), 1);
        let regions: Vec<u8> = Region::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(regions, vec![0, 1, 2, 3]);
        let diets: Vec<u8> = DietType::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(diets, vec![0, 1, 2, 3]);
        assert_eq!(DietType::Vegan.code(), 3);
        assert_eq!(Region::SouthWest.code(), 3);
    }

    #[test]
    fn test_label_parsing_is_lenient() {
        assert_eq!("High-Protein".parse::<DietType>().unwrap(), DietType::HighProtein);
        assert_eq!("fast_food".parse::<DietType>().unwrap(), DietType::FastFood);
        assert_eq!("northeast".parse::<Region>().unwrap(), Region::NorthEast);
        assert_eq!("heart_disease".parse::<Condition>().unwrap(), Condition::HeartDisease);
        assert_eq!("MALE".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("yes".parse::<YesNo>().unwrap(), YesNo::Yes);

        let err = "Martian".parse::<Region>().unwrap_err();
        assert!(err.contains("NorthEast"), "error was {}", err);
    }

    #[test]
    fn test_condition_normalization() {
        let flags = ConditionFlags::from_selection(&[Condition::None, Condition::Diabetes]);
        assert_eq!(flags, ConditionFlags::default());
        assert!(ConditionFlags::has_conflict(&[Condition::None, Condition::Diabetes]));
        assert!(!ConditionFlags::has_conflict(&[Condition::None]));
        assert!(!ConditionFlags::has_conflict(&[]));

        let flags = ConditionFlags::from_selection(&[Condition::HeartDisease, Condition::Hypertension]);
        assert!(!flags.diabetes);
        assert!(flags.heart_disease);
        assert!(flags.hypertension);
    }

    #[test]
    fn test_raw_input_json_labels() {
        let json = r#"{
            "age": 45, "sex": "Male", "bmi": 31.5, "children": 2, "smoker": "Yes",
            "region": "SouthEast", "exercise_frequency": 1, "diet_type": "Fast-Food",
            "alcohol_consumption": "no", "pre_existing_conditions": ["Heart Disease", "diabetes"],
            "sleep_hours": 6, "stress_level": 8, "water_intake": 1.5,
            "screen_time": 9.5, "health_checkups": 1
        }"#;
        let raw: RawInput = serde_json::from_str(json).unwrap();
        assert_eq!(raw.diet_type, DietType::FastFood);
        assert_eq!(raw.alcohol_consumption, YesNo::No);
        assert_eq!(
            raw.pre_existing_conditions,
            vec![Condition::HeartDisease, Condition::Diabetes]
        );

        let back = serde_json::to_value(&raw).unwrap();
        assert_eq!(back["diet_type"], "Fast-Food");
        assert_eq!(back["pre_existing_conditions"][0], "Heart Disease");
    }

    #[test]
    fn test_json_labels_ignore_case_and_separators() {
        let sex: Sex = serde_json::from_str(r#""MALE""#).unwrap();
        assert_eq!(sex, Sex::Male);
        let diet: DietType = serde_json::from_str(r#""high protein""#).unwrap();
        assert_eq!(diet, DietType::HighProtein);
        let cond: Condition = serde_json::from_str(r#""HEART-DISEASE""#).unwrap();
        assert_eq!(cond, Condition::HeartDisease);

        let err = serde_json::from_str::<Region>(r#""Mars""#).unwrap_err();
        assert!(err.to_string().contains("NorthEast"), "error was {}", err);
    }

    #[test]
    fn test_incomplete_record_is_rejected() {
        let mut full = serde_json::to_value(RawInput::default()).unwrap();
        assert!(serde_json::from_value::<RawInput>(full.clone()).is_ok());

        assert!(serde_json::from_str::<RawInput>("{}").is_err());

        let mut missing_age = full.clone();
        missing_age.as_object_mut().unwrap().remove("age");
        let err = serde_json::from_value::<RawInput>(missing_age).unwrap_err();
        assert!(err.to_string().contains("age"), "error was {}", err);

        let obj = full.as_object_mut().unwrap();
        let age = obj.remove("age").unwrap();
        obj.insert("Age".to_string(), age);
        let err = serde_json::from_value::<RawInput>(full).unwrap_err();
        assert!(err.to_string().contains("Age"), "error was {}", err);
    }

    #[test]
    fn test_vector_from_slice_checks_length() {
        let ok = EncodedVector::from_slice(&[0.0; FEATURE_COUNT]).unwrap();
        assert_eq!(ok.len(), FEATURE_COUNT);

        let err = EncodedVector::from_slice(&[0.0; 12]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::ShapeMismatch { expected: 17, actual: 12, .. }
        ));
    }

    #[test]
    fn test_vector_lookup_by_name() {
        let mut values = [0.0; FEATURE_COUNT];
        values[14] = 2.5;
        let v = EncodedVector::new(values);
        assert_eq!(v.get("water_intake"), Some(2.5));
        assert_eq!(v.get("nonexistent"), None);
        assert_eq!(v.named().count(), FEATURE_COUNT);
    }
}
