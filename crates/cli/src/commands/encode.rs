//! Show the encoded feature vector for a form submission

use anyhow::Result;
use medcost_lib::{FeatureEncoder, FEATURE_NAMES};
use serde::Serialize;
use std::process::ExitCode;
use tabled::Tabled;

use crate::output::{print_error, print_json, print_rows, OutputFormat};

use super::InputArgs;

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Feature")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: f32,
}

#[derive(Serialize)]
struct EncodeOutput {
    feature_names: Vec<&'static str>,
    values: Vec<f32>,
}

pub fn encode(args: &InputArgs, format: OutputFormat) -> Result<ExitCode> {
    let raw = args.to_raw()?;

    let vector = match FeatureEncoder::new().encode(&raw) {
        Ok(vector) => vector,
        Err(err) => {
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "error": err.kind(),
                    "message": err.to_string(),
                })),
                OutputFormat::Table => print_error(&err.to_string()),
            }
            return Ok(ExitCode::from(2));
        }
    };

    let rows: Vec<FeatureRow> = vector
        .named()
        .enumerate()
        .map(|(index, (name, value))| FeatureRow { index, name, value })
        .collect();
    let output = EncodeOutput {
        feature_names: FEATURE_NAMES.to_vec(),
        values: vector.as_slice().to_vec(),
    };

    print_rows(&rows, &output, format);
    Ok(ExitCode::SUCCESS)
}
