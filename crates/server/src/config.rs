//! Server configuration

use anyhow::Result;
use serde::Deserialize;

/// Catalog source format, normally inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Csv,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path to the catalog snapshot (CSV table or JSON record array)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Source format override; inferred from the extension when unset
    #[serde(default)]
    pub catalog_format: Option<CatalogFormat>,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Neighbors consulted per prediction
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Include price as a third model feature
    #[serde(default = "default_include_price")]
    pub include_price: bool,
}

fn default_catalog_path() -> String {
    "data/instances.csv".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_neighbors() -> usize {
    sizer_lib::DEFAULT_NEIGHBORS
}

fn default_include_price() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            catalog_format: None,
            api_port: default_api_port(),
            neighbors: default_neighbors(),
            include_price: default_include_price(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment (prefix `SIZER`)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIZER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Effective catalog format
    pub fn format(&self) -> CatalogFormat {
        self.catalog_format.unwrap_or_else(|| {
            if self.catalog_path.ends_with(".json") {
                CatalogFormat::Json
            } else {
                CatalogFormat::Csv
            }
        })
    }
}
