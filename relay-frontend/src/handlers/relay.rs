use crate::error::RelayError;
use crate::models::relay::{AnswerResponse, TranscribeRequest, TranscribeResponse, UploadImageRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use relay_core::observability::extract_request_id;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => RelayError::PayloadTooLarge(rejection.body_text()),
            _ => RelayError::Validation(rejection.body_text()),
        })
}

/// `POST /upload_image`
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UploadImageRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, RelayError> {
    let request = json_body(payload)?;
    let request_id = extract_request_id(&headers);

    let answer = state
        .relay
        .handle_image_upload(request, request_id.as_deref())
        .await?;

    Ok(Json(answer))
}

/// `POST /transcribe`
pub async fn transcribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Result<Json<TranscribeResponse>, RelayError> {
    let request = json_body(payload)?;
    let request_id = extract_request_id(&headers);

    let transcript = state
        .relay
        .handle_transcribe(request, request_id.as_deref())
        .await?;

    Ok(Json(transcript))
}
