//! Base64URL encoding per RFC 4648
//!
//! This module provides a thin wrapper around the `base64` crate using the
//! URL-safe alphabet without padding, as required for JWS compact serialization.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Encode bytes to Base64URL string
pub(crate) fn encode_bytes(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Encode UTF-8 string to Base64URL
pub(crate) fn encode(input: &str) -> String {
    encode_bytes(input.as_bytes())
}
