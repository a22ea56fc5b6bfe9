use anyhow::Result;
use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Standard alphabet, padding optional: browsers and scripts disagree on it.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Drop a `data:<mime>;base64,` prefix, keeping what follows the first comma.
///
/// Base64 never contains a comma, so any comma marks the end of a data-URL header.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

/// Decode a browser-supplied base64 payload, with or without a data-URL prefix.
///
/// ASCII whitespace anywhere in the payload is ignored, so MIME-style line
/// wrapping decodes the same as the unwrapped text.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>> {
    let data: String = strip_data_url_prefix(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    LENIENT_STANDARD
        .decode(data)
        .map_err(|e| anyhow::anyhow!("Failed to decode base64 payload: {}", e))
}

/// Canonical padded base64 for upstream JSON bodies.
pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}
