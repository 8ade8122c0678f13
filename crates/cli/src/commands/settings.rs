//! Show and update the CLI config file

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{print_json, print_success, OutputFormat};

pub fn show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            let path = Config::config_path()?;
            println!("Config file:    {}", path.display());
            println!("API URL:        {}", config.api_url.as_deref().unwrap_or("-"));
            println!(
                "Model path:     {}",
                config
                    .model_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("Default format: {}", config.default_format.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

pub fn set(
    mut config: Config,
    api_url: Option<String>,
    model_path: Option<PathBuf>,
    default_format: Option<OutputFormat>,
) -> Result<()> {
    if let Some(url) = api_url {
        config.api_url = Some(url);
    }
    if let Some(path) = model_path {
        config.model_path = Some(path);
    }
    if let Some(format) = default_format {
        let name = match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        config.default_format = Some(name.to_string());
    }

    let path = Config::config_path()?;
    config.save_to(&path)?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}
