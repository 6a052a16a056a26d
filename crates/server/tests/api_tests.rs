//! Integration tests for the sizer API endpoints
//!
//! The binary's handlers are rebuilt here over the same library state; the
//! recommendation route takes pod descriptors directly so no cluster is
//! needed.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sizer_lib::{
    CatalogEntry, InstanceCatalog, KnnMatcher, MatcherConfig, PodResources, RecommendationService,
};
use std::sync::Arc;
use tower::ServiceExt;

struct AppState {
    catalog: InstanceCatalog,
    service: RecommendationService,
}

fn entry(instance_type: &str, vcpu: f64, memory_gib: f64, price: f64) -> CatalogEntry {
    CatalogEntry {
        instance_type: instance_type.to_string(),
        vendor: None,
        vcpu,
        memory_gib,
        price,
    }
}

fn test_state() -> Arc<AppState> {
    let catalog = InstanceCatalog::from_entries(vec![
        entry("small", 2.0, 4.0, 0.05),
        entry("large", 8.0, 32.0, 0.4),
    ]);
    let mut matcher = KnnMatcher::new(MatcherConfig::default());
    matcher.fit(&catalog).unwrap();
    Arc::new(AppState {
        catalog,
        service: RecommendationService::new(matcher),
    })
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "catalog_entries": state.catalog.len(),
        "catalog_rows_excluded": state.catalog.excluded_rows(),
    }))
}

async fn catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "entries": state.catalog.entries(),
        "total": state.catalog.len(),
        "excluded_rows": state.catalog.excluded_rows(),
    }))
}

async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(pods): Json<Vec<PodResources>>,
) -> impl IntoResponse {
    match state.service.recommend(&pods) {
        Ok(result) => (StatusCode::OK, Json(json!(result))).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/catalog", get(catalog))
        .route("/api/v1/recommendation", post(recommend))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthz_reports_catalog_stats() {
    let app = test_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["catalog_entries"], 2);
}

#[tokio::test]
async fn test_catalog_endpoint_lists_entries() {
    let app = test_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["entries"][0]["instance_type"], "small");
    assert_eq!(body["entries"][1]["vcpu"], 8.0);
}

#[tokio::test]
async fn test_recommendation_for_posted_pods() {
    let app = test_router(test_state());

    let pods = json!([{
        "name": "web-0",
        "namespace": "prod",
        "containers": [{
            "name": "web",
            "cpu_request": "7",
            "memory_request": "30Gi",
            "cpu_limit": null,
            "memory_limit": null
        }]
    }]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/recommendation")
                .header("content-type", "application/json")
                .body(Body::from(pods.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["recommendation"]["predicted_instance_type"],
        "large"
    );
    assert_eq!(body["recommendation"]["total_cpu_requests"], 7.0);
    assert_eq!(body["recommendation"]["total_memory_requests"], 30.0);
    assert_eq!(body["recommendation"]["total_cpu_limits"], 0.0);
}

#[tokio::test]
async fn test_recommendation_reports_distinct_diagnostics() {
    let app = test_router(test_state());

    let pods = json!([{
        "name": "web-0",
        "namespace": "prod",
        "containers": [{
            "name": "web",
            "cpu_request": "garbage",
            "memory_request": "5Xi",
            "cpu_limit": "1",
            "memory_limit": null
        }]
    }]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/recommendation")
                .header("content-type", "application/json")
                .body(Body::from(pods.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Unreadable quantities understate totals but never fail the request
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["diagnostics"]["parse_failures"], 1);
    assert_eq!(body["diagnostics"]["unrecognized_units"], 1);
    assert_eq!(body["recommendation"]["total_cpu_requests"], 0.0);
    assert_eq!(body["recommendation"]["total_cpu_limits"], 1.0);
}
