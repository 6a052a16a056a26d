//! Cluster instance sizer CLI
//!
//! Command-line client for the sizer service: request an instance-type
//! recommendation for a cluster, inspect the catalog, and check service
//! health.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{catalog, health, recommend};

/// Cluster instance sizer CLI
#[derive(Parser)]
#[command(name = "sizer")]
#[command(author, version, about = "CLI for the cluster instance sizer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via SIZER_API_URL env var)
    #[arg(long, env = "SIZER_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend an instance type for the cluster a kubeconfig points at
    Recommend {
        /// Path to the kubeconfig file
        #[arg(long, env = "KUBECONFIG")]
        kubeconfig: String,
    },

    /// List the instance-type catalog
    Catalog,

    /// Show service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Recommend { kubeconfig } => {
            recommend::run(&client, &kubeconfig, cli.format).await?;
        }
        Commands::Catalog => {
            catalog::run(&client, cli.format).await?;
        }
        Commands::Health => {
            health::run(&client, cli.format).await?;
        }
    }

    Ok(())
}
