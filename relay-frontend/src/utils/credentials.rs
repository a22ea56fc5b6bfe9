use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

/// Compare a submitted password against the configured one without leaking
/// timing. Both sides are hashed first so their lengths never differ.
pub fn password_matches(expected: &Secret<String>, submitted: &str) -> bool {
    let expected = Sha256::digest(expected.expose_secret().as_bytes());
    let submitted = Sha256::digest(submitted.as_bytes());
    expected.as_slice().ct_eq(submitted.as_slice()).into()
}

/// Expand the configured session secret into the 64 bytes a cookie signing key needs.
pub fn session_key_material(secret: &Secret<String>) -> [u8; 64] {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    let mut key = [0u8; 64];
    key.copy_from_slice(digest.as_slice());
    key
}
