//! CLI subcommand implementations

pub mod encode;
pub mod predict;
pub mod server;
pub mod settings;

use anyhow::{Context, Result};
use clap::Args;
use medcost_lib::{Condition, DietType, RawInput, Region, Sex, YesNo};
use std::path::PathBuf;

/// Form fields; defaults match the initial state of the prediction form
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Read the whole input record from a JSON file (flags are ignored)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Age in years (18-100)
    #[arg(long, default_value_t = 30)]
    pub age: i32,

    /// Female or Male
    #[arg(long, default_value = "Female")]
    pub sex: Sex,

    /// Body mass index (10.0-50.0)
    #[arg(long, default_value_t = 25.0)]
    pub bmi: f32,

    /// Number of children (0-10)
    #[arg(long, default_value_t = 1)]
    pub children: i32,

    /// No or Yes
    #[arg(long, default_value = "No")]
    pub smoker: YesNo,

    /// NorthEast, NorthWest, SouthEast or SouthWest
    #[arg(long, default_value = "NorthEast")]
    pub region: Region,

    /// Exercise sessions per week (0-7)
    #[arg(long, default_value_t = 3)]
    pub exercise_frequency: i32,

    /// Balanced, High-Protein, Fast-Food or Vegan
    #[arg(long, default_value = "Balanced")]
    pub diet_type: DietType,

    /// No or Yes
    #[arg(long = "alcohol", default_value = "No")]
    pub alcohol_consumption: YesNo,

    /// Pre-existing condition (repeatable): Diabetes, Hypertension, "Heart Disease" or None
    #[arg(long = "condition")]
    pub conditions: Vec<Condition>,

    /// Sleep hours per night (3-12)
    #[arg(long, default_value_t = 7)]
    pub sleep_hours: i32,

    /// Stress level (1-10)
    #[arg(long, default_value_t = 5)]
    pub stress_level: i32,

    /// Water intake in liters per day (0.5-5.0)
    #[arg(long, default_value_t = 2.0)]
    pub water_intake: f32,

    /// Screen time in hours per day (1.0-16.0)
    #[arg(long, default_value_t = 6.0)]
    pub screen_time: f32,

    /// Health checkups per year (0-12)
    #[arg(long, default_value_t = 2)]
    pub health_checkups: i32,
}

impl InputArgs {
    /// Build the raw record. Range checks are left to the encoder.
    pub fn to_raw(&self) -> Result<RawInput> {
        if let Some(path) = &self.input {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse input file {}", path.display()));
        }

        Ok(RawInput {
            age: self.age,
            sex: self.sex,
            bmi: self.bmi,
            children: self.children,
            smoker: self.smoker,
            region: self.region,
            exercise_frequency: self.exercise_frequency,
            diet_type: self.diet_type,
            alcohol_consumption: self.alcohol_consumption,
            pre_existing_conditions: self.conditions.clone(),
            sleep_hours: self.sleep_hours,
            stress_level: self.stress_level,
            water_intake: self.water_intake,
            screen_time: self.screen_time,
            health_checkups: self.health_checkups,
        })
    }
}
