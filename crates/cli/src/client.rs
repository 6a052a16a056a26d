//! API client for the sizer service

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// HTTP client for the sizer API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        // Recommendations list a whole cluster, so the timeout is generous
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
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

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub kubeconfig: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub predicted_instance_type: String,
    pub total_cpu_requests: f64,
    pub total_memory_requests: f64,
    pub total_cpu_limits: f64,
    pub total_memory_limits: f64,
    pub generated_at: i64,
    pub limit_instance_type: String,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Diagnostics {
    pub fields_absent: u64,
    pub parse_failures: u64,
    pub unrecognized_units: u64,
}

impl Diagnostics {
    pub fn failures(&self) -> u64 {
        self.parse_failures + self.unrecognized_units
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub instance_type: String,
    #[serde(default)]
    pub vendor: Option<String>,
    pub vcpu: f64,
    pub memory_gib: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub entries: Vec<CatalogEntry>,
    pub total: usize,
    pub excluded_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub catalog_entries: usize,
    pub catalog_rows_excluded: usize,
}
