//! HTTP client for the inference service.
//!
//! Two endpoints are used: the multimodal answer endpoint, which takes a
//! multipart image plus optional question text, and the transcription
//! endpoint, which takes a JSON body with base64 audio.

use crate::config::InferenceSettings;
use crate::models::relay::TranscribeUpstreamRequest;
use anyhow::{Context, Result};
use relay_core::observability::TracedClientExt;
use reqwest::{multipart, Client};
use std::time::Duration;

pub const ANSWER_PATH: &str = "/api/v1/answer/";
pub const TRANSCRIBE_PATH: &str = "/api/v1/transcribe/transcribe";

const IMAGE_FILE_NAME: &str = "image.jpg";
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

pub struct InferenceClient {
    client: Client,
    settings: InferenceSettings,
}

impl InferenceClient {
    pub fn new(settings: InferenceSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .context("Failed to build inference HTTP client")?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Send an image and optional question to the answer endpoint.
    ///
    /// The raw response is returned so the caller decides how to treat
    /// non-200 replies.
    pub async fn answer(
        &self,
        image: Vec<u8>,
        text: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.url(ANSWER_PATH);

        let file = multipart::Part::bytes(image)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_CONTENT_TYPE)
            .context("Invalid image content type")?;
        let mut form = multipart::Form::new().part("file", file);
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            form = form.text("text", text.to_string());
        }

        self.client
            .traced_post(&url)
            .multipart(form)
            .send_with_request_id(request_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                anyhow::anyhow!("HTTP request failed: {}", e)
            })
    }

    /// Send base64 audio to the transcription endpoint.
    pub async fn transcribe(
        &self,
        audio_content: &str,
        audio_mime_type: &str,
        request_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.url(TRANSCRIBE_PATH);
        let body = TranscribeUpstreamRequest {
            audio_content,
            audio_mime_type,
        };

        self.client
            .traced_post(&url)
            .json(&body)
            .send_with_request_id(request_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                anyhow::anyhow!("HTTP request failed: {}", e)
            })
    }
}
