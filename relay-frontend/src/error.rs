use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;

/// Failures of the relay endpoints. Every variant is rendered as
/// `{"error": <message>}` so nothing escapes the handler boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing, empty or malformed request field.
    #[error("{0}")]
    Validation(String),

    /// Payload is not valid base64.
    #[error("{0}")]
    Decode(String),

    /// Body exceeded `server.max_body_bytes`.
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Authentication required")]
    Unauthenticated,

    /// Answer endpoint replied with something other than 200.
    #[error("Answer processing failed with upstream status {status}")]
    Upstream { status: u16 },

    /// Transcription endpoint was unreachable, timed out, or replied non-2xx.
    #[error("Transcription service error: {0:#}")]
    TranscriptionService(anyhow::Error),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::Decode(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RelayError::Upstream { .. }
            | RelayError::TranscriptionService(_)
            | RelayError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Upstream details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::Validation(msg)
            | RelayError::Decode(msg)
            | RelayError::PayloadTooLarge(msg) => msg.clone(),
            RelayError::Unauthenticated => "Authentication required".to_string(),
            RelayError::Upstream { .. } => "Answer processing failed".to_string(),
            RelayError::TranscriptionService(_) => "Transcription service error".to_string(),
            RelayError::Unhandled(err) => err.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Error processing request");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Rejected request");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}

/// Last-resort conversion of a handler panic into the usual error body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    RelayError::Unhandled(anyhow::anyhow!(message)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: RelayError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_status_is_not_leaked() {
        let (status, body) = body_of(RelayError::Upstream { status: 503 }).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Answer processing failed");
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let (status, body) =
            body_of(RelayError::Validation("No image data provided".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image data provided");
    }

    #[tokio::test]
    async fn transcription_failure_uses_generic_message() {
        let (status, body) = body_of(RelayError::TranscriptionService(anyhow::anyhow!(
            "connection refused"
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Transcription service error");
    }

    #[tokio::test]
    async fn unhandled_error_exposes_message() {
        let (status, body) = body_of(RelayError::Unhandled(anyhow::anyhow!("boom"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "boom");
    }

    #[tokio::test]
    async fn panic_payload_becomes_error_body() {
        let response = panic_response(Box::new("handler exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "handler exploded");
    }

    #[tokio::test]
    async fn unauthenticated_maps_to_401() {
        let (status, body) = body_of(RelayError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn payload_too_large_maps_to_413() {
        let (status, body) =
            body_of(RelayError::PayloadTooLarge("length limit exceeded".to_string())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "length limit exceeded");
    }
}
