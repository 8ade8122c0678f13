//! Commands that query a running medcost-server

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, format_timestamp, print_info, print_rows, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

/// Show the model loaded by the server
pub async fn show_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info = client.model_info().await?;

    match format {
        OutputFormat::Json => crate::output::print_json(&info),
        OutputFormat::Table => {
            println!("{}", "Loaded Model".bold());
            println!("{}", "=".repeat(50));
            println!("Version:                {}", info.version.cyan());
            println!("Backend:                {}", info.backend);
            println!("Features:               {}", info.n_features);
            println!("SHA-256:                {}", info.sha256);
            println!("Path:                   {}", info.path);
            println!();
            print_info(&format!("Columns: {}", info.feature_names.join(", ")));
        }
    }
    Ok(())
}

/// Show server health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.health().await?;

    if format == OutputFormat::Table {
        println!("Overall: {}", color_status(&report.status));
    }

    let mut names: Vec<&String> = report.components.keys().collect();
    names.sort();
    let rows: Vec<ComponentRow> = names
        .into_iter()
        .map(|name| {
            let c = &report.components[name];
            ComponentRow {
                name: name.clone(),
                status: color_status(&c.status),
                message: c.message.clone().unwrap_or_default(),
                last_check: format_timestamp(c.last_check_timestamp),
            }
        })
        .collect();

    print_rows(&rows, &report, format);
    Ok(())
}
