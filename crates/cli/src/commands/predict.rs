//! Cost prediction command

use anyhow::{Context, Result};
use colored::Colorize;
use medcost_lib::{CostPredictor, ModelConfig, PredictionError, Quote, QuoteService};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::Tabled;

use crate::client::{ApiClient, PredictOutcome, RemoteQuote};
use crate::output::{
    format_cost, format_timestamp, print_error, print_json, print_rows, print_warning,
    OutputFormat,
};

use super::InputArgs;

/// Exit code for requests rejected by validation or eligibility
const REJECTED: u8 = 2;

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    #[serde(flatten)]
    quote: &'a Quote,
    display: String,
}

#[derive(Serialize)]
struct RejectionOutput<'a> {
    error: &'a str,
    message: &'a str,
}

fn quote_rows(cost: &str, model_version: &str, generated_at: i64) -> Vec<QuoteRow> {
    vec![
        QuoteRow {
            field: "Predicted Insurance Cost".to_string(),
            value: cost.green().bold().to_string(),
        },
        QuoteRow {
            field: "Model".to_string(),
            value: model_version.to_string(),
        },
        QuoteRow {
            field: "Generated".to_string(),
            value: format_timestamp(generated_at),
        },
    ]
}

fn print_rejection(kind: &str, message: &str, format: OutputFormat) -> ExitCode {
    match format {
        OutputFormat::Json => print_json(&RejectionOutput {
            error: kind,
            message,
        }),
        OutputFormat::Table if kind == "ineligible_request" => print_warning(message),
        OutputFormat::Table => print_error(message),
    }
    ExitCode::from(REJECTED)
}

/// Predict with a local model artifact
pub fn predict_local(
    args: &InputArgs,
    model_path: &Path,
    currency: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let raw = args.to_raw()?;
    let predictor = CostPredictor::load(&ModelConfig::new(model_path))
        .context("Cannot predict without a model")?;
    let service = QuoteService::new(Arc::new(predictor));

    let quote = match service.quote(&raw) {
        Ok(quote) => quote,
        Err(err) if err.is_user_fixable() => {
            return Ok(print_rejection(err.kind(), &err.to_string(), format))
        }
        Err(err @ PredictionError::ShapeMismatch { .. }) => {
            return Err(err).context("Model and encoder disagree on feature layout")
        }
        Err(err) => return Err(err.into()),
    };

    let display = format_cost(quote.predicted_cost.amount(), currency);
    match format {
        OutputFormat::Json => print_json(&QuoteOutput {
            quote: &quote,
            display,
        }),
        OutputFormat::Table => {
            for warning in &quote.warnings {
                print_warning(warning);
            }
            let rows = quote_rows(&display, &quote.model_version, quote.generated_at);
            print_rows(&rows, &quote, format);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Predict through a running server
pub async fn predict_remote(
    client: &ApiClient,
    args: &InputArgs,
    format: OutputFormat,
) -> Result<ExitCode> {
    let raw = args.to_raw()?;

    let quote: RemoteQuote = match client.predict(&raw).await? {
        PredictOutcome::Quoted(quote) => quote,
        PredictOutcome::Rejected(err) => {
            return Ok(print_rejection(&err.error, &err.message, format))
        }
    };

    match format {
        OutputFormat::Json => print_json(&quote),
        OutputFormat::Table => {
            for warning in &quote.warnings {
                print_warning(warning);
            }
            let rows = quote_rows(&quote.display, &quote.model_version, quote.generated_at);
            print_rows(&rows, &quote, format);
        }
    }
    Ok(ExitCode::SUCCESS)
}
