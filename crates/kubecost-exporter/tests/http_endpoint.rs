#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use kubecost_exporter::app_state::AppState;
use kubecost_exporter::client::{ALLOCATION_PATH, ASSETS_PATH};
use kubecost_exporter::config::ExporterConfig;
use kubecost_exporter::router::build_router;

mod fake_api;
use fake_api::{samples, FakeApi};

fn app_with(cfg: ExporterConfig, api: Arc<FakeApi>) -> Router {
    build_router(AppState::with_fetch(cfg, api))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn metrics_endpoint_serves_text_format() {
    let app = app_with(fake_api::config(), Arc::new(fake_api::healthy()));
    let (status, content_type, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert_eq!(samples(&body, "assets_cost_total").len(), 2);
    assert_eq!(samples(&body, "assets_cost_cluster_allocation_total").len(), 2);
    assert!(body.contains("assets_exporter_build_info{version=\""));
}

#[tokio::test]
async fn upstream_outage_is_still_200() {
    let app = app_with(fake_api::config(), Arc::new(FakeApi::new()));
    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(samples(&body, "assets_up"), vec!["assets_up 0"]);
}

#[tokio::test]
async fn collect_filter_from_query_string() {
    let api = Arc::new(fake_api::healthy());
    let app = app_with(fake_api::config(), api.clone());
    let (status, _, body) = get(app, "/metrics?collect%5B%5D=scrape_assets").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(samples(&body, "assets_cost_total").len(), 2);
    assert!(samples(&body, "assets_cost_cluster_allocation_total").is_empty());
    assert!(api.call_to(ALLOCATION_PATH).is_none());
}

#[tokio::test]
async fn per_source_override_from_query_string() {
    let api = Arc::new(fake_api::healthy());
    let app = app_with(fake_api::config(), api.clone());
    let uri = "/metrics?scrape_assets%5B%5D=filterClusters%3Dprod%2Caggregate%3Dtype";
    let (status, _, _) = get(app, uri).await;

    assert_eq!(status, StatusCode::OK);
    let query = api.call_to(ASSETS_PATH).unwrap();
    assert_eq!(query[0], ("filterClusters".to_string(), "prod".to_string()));
    assert_eq!(query[1], ("aggregate".to_string(), "type".to_string()));
    assert!(query.iter().any(|(k, _)| k == "window"));
}

#[tokio::test]
async fn custom_telemetry_path() {
    let mut cfg = fake_api::config();
    cfg.web.telemetry_path = "/kubecost-metrics".into();
    let api = Arc::new(fake_api::healthy());

    let (status, _, body) = get(app_with(cfg.clone(), api.clone()), "/kubecost-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("assets_up 1"));

    let (status, _, _) = get(app_with(cfg, api), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn landing_page_links_to_metrics() {
    let app = app_with(fake_api::config(), Arc::new(fake_api::healthy()));
    let (status, content_type, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("<a href=\"/metrics\">"));
    assert!(body.contains("scrape_assets"));
    assert!(body.contains("Scrapes the information about Cost Allocation API"));
}

#[tokio::test]
async fn healthz_does_not_touch_upstream() {
    let api = Arc::new(fake_api::healthy());
    let app = app_with(fake_api::config(), api.clone());
    let (status, _, body) = get(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert!(api.calls().is_empty());
}
