//! Recommendation command

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, Recommendation, RecommendRequest};
use crate::output::{format_cores, format_gib, print_warning, OutputFormat};

/// Row for the totals table
#[derive(Tabled)]
struct TotalsRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "CPU (cores)")]
    cpu: String,
    #[tabled(rename = "Memory (GiB)")]
    memory: String,
}

/// Read a kubeconfig and request a recommendation for its cluster
pub async fn run(client: &ApiClient, kubeconfig_path: &str, format: OutputFormat) -> Result<()> {
    let kubeconfig = tokio::fs::read_to_string(kubeconfig_path)
        .await
        .with_context(|| format!("Failed to read kubeconfig {}", kubeconfig_path))?;

    let request = RecommendRequest { kubeconfig };
    let result: Recommendation = client.post("api/v1/recommendation", &request).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            println!(
                "Recommended instance type: {}",
                result.predicted_instance_type.green().bold()
            );
            println!(
                "Limit-based alternative:   {}",
                result.limit_instance_type
            );
            println!();

            let rows = vec![
                TotalsRow {
                    kind: "Requests".to_string(),
                    cpu: format_cores(result.total_cpu_requests),
                    memory: format_gib(result.total_memory_requests),
                },
                TotalsRow {
                    kind: "Limits".to_string(),
                    cpu: format_cores(result.total_cpu_limits),
                    memory: format_gib(result.total_memory_limits),
                },
            ];
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if result.diagnostics.failures() > 0 {
                print_warning(&format!(
                    "{} quantity field(s) could not be read ({} malformed, {} with unrecognized units); totals are understated",
                    result.diagnostics.failures(),
                    result.diagnostics.parse_failures,
                    result.diagnostics.unrecognized_units
                ));
            }
        }
    }

    Ok(())
}
