//! API client for talking to a running medcost-server

use anyhow::{Context, Result};
use medcost_lib::{ModelInfo, RawInput};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Successful `/api/v1/predict` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteQuote {
    pub predicted_cost: f64,
    pub display: String,
    pub model_version: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub generated_at: i64,
}

/// Error body returned for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub user_fixable: bool,
    #[serde(default)]
    pub field: Option<String>,
}

/// Outcome of a remote prediction
#[derive(Debug)]
pub enum PredictOutcome {
    Quoted(RemoteQuote),
    /// Rejected for a reason the user can act on (bad field, ineligible)
    Rejected(ApiError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub components: std::collections::HashMap<String, ComponentReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        // healthz answers 503 with a body worth showing
        if !response.status().is_success() && response.status() != StatusCode::SERVICE_UNAVAILABLE {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Request a quote; user-facing rejections are returned, not raised
    pub async fn predict(&self, raw: &RawInput) -> Result<PredictOutcome> {
        let url = self.base_url.join("api/v1/predict").context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(raw)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if status.is_success() {
            let quote = response.json().await.context("Failed to parse response")?;
            return Ok(PredictOutcome::Quoted(quote));
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&body) {
            Ok(err) if err.user_fixable => Ok(PredictOutcome::Rejected(err)),
            Ok(err) => anyhow::bail!("Server error ({}): {}", err.error, err.message),
            Err(_) => anyhow::bail!("API error ({}): {}", status, body),
        }
    }

    pub async fn model_info(&self) -> Result<ModelInfo> {
        self.get("api/v1/model").await
    }

    pub async fn health(&self) -> Result<HealthReport> {
        self.get("healthz").await
    }
}
