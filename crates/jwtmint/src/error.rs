//! Errors for jwtmint

use thiserror::Error;

/// JWTMint Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Algorithm '{0}' is not supported")]
    AlgorithmUnsupported(String),

    #[error("The 'none' algorithm is rejected in strict mode (RFC 8725)")]
    AlgorithmNoneRejected,

    #[error("Integer overflow in timestamp arithmetic")]
    TimestampOverflow,

    // ============================================================================
    // Key Errors
    // ============================================================================
    #[error("Key file '{path}' could not be read: {reason}")]
    KeyUnreadable { path: String, reason: String },

    #[error("Key file '{path}' is not a usable signing key: {reason}")]
    KeyInvalid { path: String, reason: String },

    #[error("Key file '{path}' could not be decrypted with the configured passphrase")]
    KeyPassphraseInvalid { path: String },

    // ============================================================================
    // Claims Errors
    // ============================================================================
    #[error("Claims serialization failed: {0}")]
    ClaimsSerialization(String),

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Signing with algorithm '{algorithm}' failed: {reason}")]
    SignatureFailed { algorithm: String, reason: String },

    #[error(
        "Key type mismatch for algorithm '{algorithm}': expected {expected_key_type}, got {actual_key_type}"
    )]
    KeyTypeMismatch {
        algorithm: String,
        expected_key_type: String,
        actual_key_type: String,
    },
}

impl Error {
    /// Whether the error happened while resolving the signing key
    pub fn is_key_resolution(&self) -> bool {
        matches!(
            self,
            Error::KeyUnreadable { .. } | Error::KeyInvalid { .. } | Error::KeyPassphraseInvalid { .. }
        )
    }

    /// Whether the error was produced by the signing primitive
    pub fn is_signing(&self) -> bool {
        matches!(
            self,
            Error::SignatureFailed { .. } | Error::KeyTypeMismatch { .. }
        )
    }
}

/// Result type alias for JWTMint operations
pub type Result<T> = std::result::Result<T, Error>;
