//! Upload relay: validate and decode a browser payload, forward it to the
//! inference service, and reshape the reply.
//!
//! Audio is always base64 on the inbound side. It is decoded here so that
//! malformed uploads are rejected before the upstream is contacted, then
//! re-encoded canonically for the upstream JSON contract.

use crate::error::RelayError;
use crate::models::relay::{
    AnswerResponse, AnswerUpstream, TranscribeRequest, TranscribeResponse, TranscriptUpstream,
    UploadImageRequest,
};
use crate::services::inference_client::InferenceClient;
use crate::services::metrics::record_upstream;
use crate::utils::payload::{decode_base64_payload, encode_base64};
use anyhow::Context;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::Instrument;

/// Longest answer prefix written to the logs.
const LOG_SUMMARY_CHARS: usize = 100;

#[derive(Clone)]
pub struct RelayService {
    client: Arc<InferenceClient>,
}

impl RelayService {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    /// Relay an image (and optional question) to the answer endpoint.
    pub async fn handle_image_upload(
        &self,
        request: UploadImageRequest,
        request_id: Option<&str>,
    ) -> Result<AnswerResponse, RelayError> {
        tracing::info!("Received image upload request");

        let image = match request.image.as_deref() {
            Some(image) if !image.is_empty() => image,
            _ => {
                return Err(RelayError::Validation(
                    "No image data provided".to_string(),
                ))
            }
        };

        let image_bytes = decode_base64_payload(image).map_err(|e| {
            tracing::warn!("Rejected image payload: {}", e);
            RelayError::Decode("Invalid image data".to_string())
        })?;
        tracing::info!(bytes = image_bytes.len(), "Successfully decoded base64 image");

        tracing::info!(
            has_text = request.text.as_deref().is_some_and(|t| !t.is_empty()),
            "Sending image and optional text to answer endpoint"
        );
        let response = self
            .client
            .answer(image_bytes, request.text.as_deref(), request_id)
            .await
            .inspect_err(|_| record_upstream("answer", "error"))?;

        let status = response.status();
        if status != StatusCode::OK {
            record_upstream("answer", "rejected");
            tracing::error!(
                status = status.as_u16(),
                "Answer processing failed with upstream status"
            );
            return Err(RelayError::Upstream {
                status: status.as_u16(),
            });
        }

        let upstream: AnswerUpstream = response
            .json()
            .await
            .context("Answer endpoint returned invalid JSON")
            .inspect_err(|_| record_upstream("answer", "error"))?;
        record_upstream("answer", "success");

        tracing::info!("Answer received: {}...", summarize(&upstream.answer));

        Ok(AnswerResponse {
            answer: upstream.answer,
        })
    }

    /// Relay one recorded audio chunk to the transcription endpoint.
    pub async fn handle_transcribe(
        &self,
        request: TranscribeRequest,
        request_id: Option<&str>,
    ) -> Result<TranscribeResponse, RelayError> {
        let span = tracing::info_span!("transcribe_chunk", chunk_index = request.chunk_index);
        self.transcribe_chunk(request, request_id)
            .instrument(span)
            .await
    }

    async fn transcribe_chunk(
        &self,
        request: TranscribeRequest,
        request_id: Option<&str>,
    ) -> Result<TranscribeResponse, RelayError> {
        tracing::info!(
            chunk_size = request.chunk_size.seconds(),
            audio_mime_type = %request.audio_mime_type,
            "Received transcription request"
        );

        let audio = match request.audio.as_deref() {
            Some(audio) if !audio.is_empty() => audio,
            _ => {
                return Err(RelayError::Validation(
                    "No audio data provided".to_string(),
                ))
            }
        };

        let audio_bytes = decode_base64_payload(audio).map_err(|e| {
            tracing::warn!("Rejected audio payload: {}", e);
            RelayError::Decode("Invalid audio data".to_string())
        })?;
        tracing::info!(bytes = audio_bytes.len(), "Successfully decoded base64 audio");

        let audio_content = encode_base64(&audio_bytes);

        tracing::info!("Sending audio chunk to transcription endpoint");
        let upstream = self
            .call_transcription(&audio_content, &request.audio_mime_type, request_id)
            .await
            .map_err(|e| {
                record_upstream("transcribe", "error");
                RelayError::TranscriptionService(e)
            })?;
        record_upstream("transcribe", "success");

        tracing::info!(
            confidence = upstream.confidence,
            "Transcript received: {}...",
            summarize(&upstream.transcript)
        );

        Ok(TranscribeResponse::success(
            request.chunk_index,
            request.chunk_size,
            upstream,
        ))
    }

    async fn call_transcription(
        &self,
        audio_content: &str,
        audio_mime_type: &str,
        request_id: Option<&str>,
    ) -> anyhow::Result<TranscriptUpstream> {
        let response = self
            .client
            .transcribe(audio_content, audio_mime_type, request_id)
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("transcription endpoint returned status {}", status);
        }

        response
            .json::<TranscriptUpstream>()
            .await
            .context("Transcription endpoint returned invalid JSON")
    }
}

fn summarize(text: &str) -> String {
    text.chars().take(LOG_SUMMARY_CHARS).collect()
}
