//! Random URL-safe tokens for CSRF state and session identifiers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a random state token for CSRF protection
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 characters).
pub fn generate_state() -> String {
    random_token()
}

/// Generate an identifier for a server-side session.
pub fn generate_session_id() -> String {
    random_token()
}

/// Validate that the state token echoed by the provider matches the stored one.
///
/// The comparison walks the full length of both inputs so the time taken does
/// not reveal the position of the first differing byte.
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let expected = expected.as_bytes();
    let actual = actual.as_bytes();
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
