//! Service health command

use anyhow::Result;

use crate::client::{ApiClient, HealthResponse};
use crate::output::{print_success, OutputFormat};

/// Show the service health summary
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: HealthResponse = client.get("healthz").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            print_success(&format!("Service is {}", result.status));
            println!("Catalog entries:   {}", result.catalog_entries);
            println!("Rows excluded:     {}", result.catalog_rows_excluded);
        }
    }

    Ok(())
}
