use crate::models::user::AuthUser;
use askama::Template;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: AuthUser,
    pub current_page: &'static str,
}

#[derive(Template)]
#[template(path = "recording.html")]
pub struct RecordingTemplate {
    pub user: AuthUser,
    pub current_page: &'static str,
}

pub async fn index(user: AuthUser) -> impl IntoResponse {
    tracing::info!(user = %user.username, "Homepage accessed");
    IndexTemplate {
        user,
        current_page: "index",
    }
}

pub async fn recording(user: AuthUser) -> impl IntoResponse {
    tracing::info!(user = %user.username, "Recording page accessed");
    RecordingTemplate {
        user,
        current_page: "recording",
    }
}

/// Liveness check.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "relay-frontend",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
