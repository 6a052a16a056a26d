//! Cluster instance sizer service
//!
//! Builds the instance-type catalog and the nearest-neighbor match model
//! once at startup, then serves recommendations over HTTP. An empty
//! catalog is fatal here: the process refuses to start rather than serve
//! predictions it cannot back.

use anyhow::{Context, Result};
use sizer_lib::{InstanceCatalog, KnnMatcher, MatcherConfig, RecommendationService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod cluster;
mod config;
mod metrics;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sizer-server");

    let config = config::ServerConfig::load()?;
    info!(catalog_path = %config.catalog_path, "Server configured");

    let catalog = load_catalog(&config)?;
    info!(
        entries = catalog.len(),
        excluded = catalog.excluded_rows(),
        "Catalog loaded"
    );

    let mut matcher = KnnMatcher::new(MatcherConfig {
        neighbors: config.neighbors,
        include_price: config.include_price,
    });
    matcher
        .fit(&catalog)
        .with_context(|| format!("cannot serve predictions from {}", config.catalog_path))?;

    let sizer_metrics = metrics::SizerMetrics::new();
    sizer_metrics.set_catalog_stats(catalog.len(), catalog.excluded_rows());

    let state = Arc::new(api::AppState::new(
        catalog,
        RecommendationService::new(matcher),
        sizer_metrics,
    ));

    let api_handle = tokio::spawn(api::serve(config.api_port, state));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
        result = api_handle => result??,
    }

    Ok(())
}

fn load_catalog(config: &config::ServerConfig) -> Result<InstanceCatalog> {
    let path = &config.catalog_path;
    match config.format() {
        config::CatalogFormat::Csv => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open catalog {path}"))?;
            InstanceCatalog::from_csv_reader(file)
                .with_context(|| format!("failed to load catalog {path}"))
        }
        config::CatalogFormat::Json => {
            let bytes =
                std::fs::read(path).with_context(|| format!("failed to open catalog {path}"))?;
            InstanceCatalog::from_json_slice(&bytes)
                .with_context(|| format!("failed to load catalog {path}"))
        }
    }
}
