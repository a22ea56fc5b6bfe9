use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_AUDIO_MIME_TYPE: &str = "audio/webm;codecs=opus";

/// Body of `POST /upload_image`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadImageRequest {
    /// Base64 image, optionally as a data URL.
    pub image: Option<String>,
    pub text: Option<String>,
}

/// Body of `POST /transcribe`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeRequest {
    /// Base64 audio, optionally as a data URL.
    pub audio: Option<String>,
    #[serde(default)]
    pub chunk_size: ChunkSize,
    #[serde(default)]
    pub chunk_index: u64,
    #[serde(default = "default_audio_mime_type")]
    pub audio_mime_type: String,
}

fn default_audio_mime_type() -> String {
    DEFAULT_AUDIO_MIME_TYPE.to_string()
}

/// Duration of a recorded audio chunk, carried on the wire as whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChunkSize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl ChunkSize {
    pub fn seconds(self) -> u8 {
        match self {
            ChunkSize::Small => 1,
            ChunkSize::Medium => 2,
            ChunkSize::Large => 3,
            ChunkSize::XLarge => 4,
        }
    }
}

impl TryFrom<u8> for ChunkSize {
    type Error = String;

    fn try_from(seconds: u8) -> Result<Self, Self::Error> {
        match seconds {
            1 => Ok(ChunkSize::Small),
            2 => Ok(ChunkSize::Medium),
            3 => Ok(ChunkSize::Large),
            4 => Ok(ChunkSize::XLarge),
            other => Err(format!("chunk_size must be 1-4 seconds, got {}", other)),
        }
    }
}

impl From<ChunkSize> for u8 {
    fn from(size: ChunkSize) -> Self {
        size.seconds()
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Upstream reply from the multimodal answer endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerUpstream {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

/// Upstream reply from the transcription endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptUpstream {
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
}

/// JSON body sent to the transcription endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TranscribeUpstreamRequest<'a> {
    pub audio_content: &'a str,
    pub audio_mime_type: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub status: String,
    pub chunk_index: u64,
    pub chunk_size: ChunkSize,
    pub transcript: String,
    pub confidence: f64,
}

impl TranscribeResponse {
    pub fn success(chunk_index: u64, chunk_size: ChunkSize, upstream: TranscriptUpstream) -> Self {
        Self {
            status: "success".to_string(),
            chunk_index,
            chunk_size,
            transcript: upstream.transcript,
            confidence: upstream.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcribe_request_defaults() {
        let request: TranscribeRequest = serde_json::from_value(json!({ "audio": "AAAA" })).unwrap();

        assert_eq!(request.chunk_size, ChunkSize::Medium);
        assert_eq!(request.chunk_index, 0);
        assert_eq!(request.audio_mime_type, "audio/webm;codecs=opus");
    }

    #[test]
    fn chunk_size_rejects_out_of_range() {
        let result: Result<TranscribeRequest, _> =
            serde_json::from_value(json!({ "audio": "AAAA", "chunk_size": 7 }));
        assert!(result.is_err());
    }

    #[test]
    fn chunk_size_serializes_as_seconds() {
        let response = TranscribeResponse::success(
            3,
            ChunkSize::XLarge,
            TranscriptUpstream {
                transcript: "hello".to_string(),
                confidence: 0.5,
            },
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "success",
                "chunk_index": 3,
                "chunk_size": 4,
                "transcript": "hello",
                "confidence": 0.5
            })
        );
    }

    #[test]
    fn upstream_fields_default_when_absent() {
        let answer: AnswerUpstream = serde_json::from_value(json!({})).unwrap();
        assert_eq!(answer.answer, "");

        let transcript: TranscriptUpstream = serde_json::from_value(json!({ "other": 1 })).unwrap();
        assert_eq!(transcript.transcript, "");
        assert_eq!(transcript.confidence, 0.0);
    }

    #[test]
    fn upstream_null_fields_fall_back_to_defaults() {
        let transcript: TranscriptUpstream =
            serde_json::from_value(json!({ "transcript": "hi", "confidence": null })).unwrap();
        assert_eq!(transcript.transcript, "hi");
        assert_eq!(transcript.confidence, 0.0);

        let transcript: TranscriptUpstream =
            serde_json::from_value(json!({ "transcript": null, "confidence": 0.4 })).unwrap();
        assert_eq!(transcript.transcript, "");
        assert_eq!(transcript.confidence, 0.4);

        let answer: AnswerUpstream = serde_json::from_value(json!({ "answer": null })).unwrap();
        assert_eq!(answer.answer, "");
    }
}
