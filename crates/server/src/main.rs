//! medcost-server - medical insurance cost prediction service
//!
//! Loads the regression model once at startup and serves cost estimates,
//! health probes and Prometheus metrics over HTTP.

use anyhow::{Context, Result};
use medcost_lib::{
    health::{components, HealthRegistry},
    observability::{PredictionMetrics, StructuredLogger},
    CostPredictor, EligibilityGate, QuoteService,
};
use medcost_server::{api, config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting medcost-server");

    let config = config::ServerConfig::load()?;
    info!(instance = %config.instance_name, model_path = %config.model_path.display(), "Server configured");

    let health_registry = HealthRegistry::with_components(&[components::MODEL, components::API]).await;
    let metrics = PredictionMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);

    // No model, no service: a load failure ends the process here.
    let predictor = match CostPredictor::load(&config.model_config()) {
        Ok(predictor) => predictor,
        Err(err) => {
            logger.log_model_load_failed(&config.model_path.display().to_string(), &err.to_string());
            return Err(err).context("Cannot serve predictions without a model");
        }
    };

    let model = predictor.info().clone();
    metrics.set_model_info(&model.version, &model.backend);
    logger.log_model_loaded(&model.version, &model.backend, &model.sha256);

    let service = QuoteService::new(Arc::new(predictor))
        .with_gate(EligibilityGate::new(config.max_eligible_age));
    let app_state = Arc::new(
        api::AppState::new(health_registry.clone(), metrics, logger.clone(), service)
            .with_currency_symbol(config.currency_symbol.clone()),
    );

    health_registry.set_ready(true).await;
    logger.log_startup(SERVER_VERSION, &model.version, config.api_port);

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
