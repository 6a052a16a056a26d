//! HTTP API: recommendations, catalog inspection, health, metrics

use crate::cluster::{self, ClusterError};
use crate::metrics::SizerMetrics;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use sizer_lib::{
    AggregationDiagnostics, CatalogEntry, InstanceCatalog, Recommendation, RecommendationService,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared application state, read-only after startup
pub struct AppState {
    pub catalog: InstanceCatalog,
    pub service: RecommendationService,
    pub metrics: SizerMetrics,
}

impl AppState {
    pub fn new(
        catalog: InstanceCatalog,
        service: RecommendationService,
        metrics: SizerMetrics,
    ) -> Self {
        Self {
            catalog,
            service,
            metrics,
        }
    }
}

/// Recommendation request carrying the cluster credential
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Kubeconfig YAML granting access to the cluster to size
    pub kubeconfig: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub limit_instance_type: String,
    pub diagnostics: AggregationDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub entries: Vec<CatalogEntry>,
    pub total: usize,
    pub excluded_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_entries: usize,
    pub catalog_rows_excluded: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

/// Produce one recommendation for the cluster the supplied kubeconfig
/// points at. Unreadable quantities understate the totals and are reported
/// in the diagnostics; they never fail the request.
async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    let started = Instant::now();

    let pods = match cluster::list_cluster_pods(&request.kubeconfig).await {
        Ok(pods) => pods,
        Err(err) => {
            warn!(error = %err, "cluster listing failed");
            let status = match err {
                ClusterError::InvalidKubeconfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ClusterError::ListFailed(_) => StatusCode::BAD_GATEWAY,
            };
            return (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response();
        }
    };
    state.metrics.observe_pods(pods.len());

    match state.service.recommend(&pods) {
        Ok(result) => {
            state
                .metrics
                .observe_recommendation(started.elapsed(), &result.diagnostics);
            (
                StatusCode::OK,
                Json(RecommendResponse {
                    recommendation: result.recommendation,
                    limit_instance_type: result.limit_instance_type,
                    diagnostics: result.diagnostics,
                }),
            )
                .into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CatalogResponse {
        entries: state.catalog.entries().to_vec(),
        total: state.catalog.len(),
        excluded_rows: state.catalog.excluded_rows(),
    })
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        catalog_entries: state.catalog.len(),
        catalog_rows_excluded: state.catalog.excluded_rows(),
    })
}

/// The process only reaches serving with a loaded catalog and a fitted
/// model, so readiness reduces to liveness.
async fn readyz() -> impl IntoResponse {
    Json(ReadinessResponse { ready: true })
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            err.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/recommendation", post(recommend))
        .route("/api/v1/catalog", get(catalog))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
