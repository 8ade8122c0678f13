//! Server configuration

use anyhow::{Context, Result};
use medcost_lib::predictor::{DEFAULT_CURRENCY_SYMBOL, DEFAULT_MAX_ELIGIBLE_AGE};
use medcost_lib::ModelConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name used in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the prediction, health and metrics API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Path to the serialized regression model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA-256 of the model artifact
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Oldest age that receives a quote
    #[serde(default = "default_max_eligible_age")]
    pub max_eligible_age: i32,

    /// Symbol prefixed to rendered costs
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "medcost".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/insurance_model.onnx")
}

fn default_max_eligible_age() -> i32 {
    DEFAULT_MAX_ELIGIBLE_AGE
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            model_path: default_model_path(),
            model_sha256: None,
            max_eligible_age: default_max_eligible_age(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `medcost.{toml,yaml,json}` file
    /// and `MEDCOST_*` environment variables (environment wins)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("medcost").required(false))
            .add_source(config::Environment::with_prefix("MEDCOST"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Invalid server configuration")
    }

    pub fn model_config(&self) -> ModelConfig {
        let model = ModelConfig::new(&self.model_path);
        match &self.model_sha256 {
            Some(sha) => model.with_checksum(sha.clone()),
            None => model,
        }
    }
}
