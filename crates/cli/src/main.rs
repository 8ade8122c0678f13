//! Medical Insurance Cost Predictor CLI
//!
//! Estimates insurance costs from lifestyle and health attributes, either
//! with a local model artifact or through a running medcost-server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::{encode, predict, server, settings, InputArgs};
use std::path::PathBuf;
use std::process::ExitCode;

/// Medical Insurance Cost Predictor CLI
#[derive(Parser)]
#[command(name = "medcost")]
#[command(author, version, about = "CLI for the Medical Insurance Cost Predictor", long_about = None)]
pub struct Cli {
    /// Server URL (can also be set via MEDCOST_API_URL env var)
    #[arg(long, env = "MEDCOST_API_URL")]
    pub api_url: Option<String>,

    /// Local model artifact (.onnx or forest .json); takes precedence over the server
    #[arg(long, env = "MEDCOST_MODEL")]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Currency symbol for locally computed costs
    #[arg(long, default_value = "₹")]
    pub currency: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the insurance cost for one person
    Predict(InputArgs),

    /// Show the encoded feature vector without predicting
    Encode(InputArgs),

    /// Show the model loaded by the server
    Model,

    /// Show server health
    Health,

    /// Show or change CLI settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings
    Show,

    /// Update settings
    Set {
        /// Default server URL
        #[arg(long)]
        url: Option<String>,

        /// Default local model artifact
        #[arg(long)]
        model_path: Option<PathBuf>,

        /// Default output format
        #[arg(long)]
        default_format: Option<output::OutputFormat>,
    },
}

fn api_client(cli_url: Option<String>, saved: &config::Config) -> Result<client::ApiClient> {
    match cli_url.or_else(|| saved.api_url.clone()) {
        Some(url) => client::ApiClient::new(&url),
        None => bail!("No server configured; pass --api-url or set MEDCOST_API_URL"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let saved = config::Config::load()?;

    let format = cli
        .format
        .or_else(|| {
            saved
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_name)
        })
        .unwrap_or_default();

    match cli.command {
        Commands::Predict(args) => match cli.model.or_else(|| saved.model_path.clone()) {
            Some(model) => predict::predict_local(&args, &model, &cli.currency, format),
            None => {
                let client = api_client(cli.api_url, &saved)?;
                predict::predict_remote(&client, &args, format).await
            }
        },
        Commands::Encode(args) => encode::encode(&args, format),
        Commands::Model => {
            let client = api_client(cli.api_url, &saved)?;
            server::show_model(&client, format).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => {
            let client = api_client(cli.api_url, &saved)?;
            server::show_health(&client, format).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(cmd) => {
            match cmd {
                ConfigCommands::Show => settings::show(&saved, format)?,
                ConfigCommands::Set {
                    url,
                    model_path,
                    default_format,
                } => settings::set(saved, url, model_path, default_format)?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
