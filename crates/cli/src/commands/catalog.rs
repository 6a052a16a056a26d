//! Catalog inspection command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, CatalogResponse};
use crate::output::{format_gib, format_price, print_warning, OutputFormat};

/// Row for the catalog table
#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Instance Type")]
    instance_type: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "vCPU")]
    vcpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Price/h")]
    price: String,
}

/// List the instance-type catalog the service predicts from
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: CatalogResponse = client.get("api/v1/catalog").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            if result.entries.is_empty() {
                print_warning("Catalog is empty");
                return Ok(());
            }

            let rows: Vec<CatalogRow> = result
                .entries
                .iter()
                .map(|e| CatalogRow {
                    instance_type: e.instance_type.clone(),
                    vendor: e.vendor.clone().unwrap_or_else(|| "-".to_string()),
                    vcpu: format!("{:.0}", e.vcpu),
                    memory: format_gib(e.memory_gib),
                    price: format_price(e.price),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} instance types", result.total);

            if result.excluded_rows > 0 {
                print_warning(&format!(
                    "{} source row(s) were excluded during load",
                    result.excluded_rows
                ));
            }
        }
    }

    Ok(())
}
