//! Operational HTTP endpoints.
//!
//! - `/`        : landing page
//! - `/healthz` : liveness
//! - telemetry  : one collection cycle, Prometheus text format

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::scrape;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn landing(State(state): State<AppState>) -> Html<String> {
    let path = &state.cfg().web.telemetry_path;
    let mut items = String::new();
    for s in state.sources() {
        items.push_str(&format!("<li><code>{}</code>: {}</li>\n", s.name(), s.describe()));
    }
    Html(format!(
        "<html>\n<head><title>Kubecost Exporter</title></head>\n<body>\n\
         <h1>Kubecost Exporter</h1>\n<p><a href=\"{path}\">Metrics</a></p>\n\
         <ul>\n{items}</ul>\n</body>\n</html>\n"
    ))
}

/// Source failures are reported inside the body, never as an HTTP error.
pub async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let plan = scrape::from_query(state.sources(), &query);
    let body = state.orchestrator().collect(&plan).await;

    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response()
}
