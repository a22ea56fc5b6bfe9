use axum::{http::StatusCode, response::IntoResponse};

/// Prometheus scrape endpoint.
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        crate::services::metrics::get_metrics(),
    )
}
