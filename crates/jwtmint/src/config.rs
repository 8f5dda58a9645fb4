//! Signer configuration
//!
//! A [`SignerConfig`] is built in code or loaded from a JSON document such as:
//!
//! ```json
//! {
//!   "jwtAlgo": "RS256",
//!   "privateKeyPath": "/etc/issuer/private.pem",
//!   "privateKeyPassPhrase": "changeit",
//!   "accessTokenExpiration": 3600
//! }
//! ```
//!
//! `keyId` and `strictAlgorithm` are optional as well.

use crate::error::{Error, Result};
use crate::keys::KeySource;
use crate::limits::MAX_CONFIG_FILE_SIZE;
use miniserde::Deserialize;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Immutable configuration of a [`TokenSigner`](crate::TokenSigner)
#[derive(Clone, Deserialize)]
pub struct SignerConfig {
    #[serde(rename = "jwtAlgo")]
    algorithm: String,

    #[serde(rename = "privateKeyPath")]
    key_path: String,

    #[serde(rename = "privateKeyPassPhrase")]
    key_passphrase: Option<String>,

    #[serde(rename = "accessTokenExpiration")]
    expiration_seconds: u64,

    #[serde(rename = "keyId")]
    key_id: Option<String>,

    #[serde(rename = "strictAlgorithm")]
    strict_algorithm: Option<bool>,
}

impl SignerConfig {
    pub fn new(
        algorithm: impl Into<String>,
        key_path: impl Into<String>,
        expiration_seconds: u64,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_path: key_path.into(),
            key_passphrase: None,
            expiration_seconds,
            key_id: None,
            strict_algorithm: None,
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        miniserde::json::from_str(json).map_err(|_| {
            Error::ConfigurationInvalid(
                "expected an object with jwtAlgo, privateKeyPath and accessTokenExpiration".into(),
            )
        })
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable =
            |e: std::io::Error| Error::ConfigurationInvalid(format!("{}: {e}", path.display()));

        let file = std::fs::File::open(path).map_err(unreadable)?;
        let mut contents = String::new();
        file.take(MAX_CONFIG_FILE_SIZE + 1)
            .read_to_string(&mut contents)
            .map_err(unreadable)?;

        if contents.len() as u64 > MAX_CONFIG_FILE_SIZE {
            return Err(Error::ConfigurationInvalid(format!(
                "{}: file exceeds {MAX_CONFIG_FILE_SIZE} bytes",
                path.display()
            )));
        }
        Self::from_json(&contents)
    }

    /// Passphrase for an encrypted key file
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.key_passphrase = Some(passphrase.into());
        self
    }

    /// Key identifier emitted as the `kid` header parameter
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Reject unknown algorithm names and `"none"` instead of falling back
    pub fn with_strict_algorithm(mut self, strict: bool) -> Self {
        self.strict_algorithm = Some(strict);
        self
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn expiration_seconds(&self) -> u64 {
        self.expiration_seconds
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn is_strict_algorithm(&self) -> bool {
        self.strict_algorithm.unwrap_or(false)
    }

    /// Check the configuration without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.key_path.trim().is_empty() {
            return Err(Error::ConfigurationInvalid(
                "privateKeyPath must not be empty".into(),
            ));
        }
        if matches!(&self.key_id, Some(kid) if kid.is_empty()) {
            return Err(Error::ConfigurationInvalid("keyId must not be empty".into()));
        }
        Ok(())
    }

    pub(crate) fn key_source(&self) -> KeySource {
        let source = KeySource::new(&self.key_path);
        match &self.key_passphrase {
            Some(passphrase) => source.with_passphrase(passphrase.as_str()),
            None => source,
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("algorithm", &self.algorithm)
            .field("key_path", &self.key_path)
            .field(
                "key_passphrase",
                &self.key_passphrase.as_ref().map(|_| "<redacted>"),
            )
            .field("expiration_seconds", &self.expiration_seconds)
            .field("key_id", &self.key_id)
            .field("strict_algorithm", &self.is_strict_algorithm())
            .finish()
    }
}
