//! Signing key resolution
//!
//! A [`KeyProvider`] turns a [`KeySource`] (key file path plus optional
//! passphrase) into a [`KeyHandle`] the first time a token is signed, and
//! hands out the same handle for every later signature.

use crate::algorithm::AlgorithmType;
use crate::error::{Error, Result};
use crate::limits::MAX_KEY_FILE_SIZE;
use crate::utils::pem::{DecodeError, PrivateKeyDer, decode_private_key};

use aws_lc_rs::signature::{
    ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
    ECDSA_P521_SHA512_FIXED_SIGNING, EcdsaKeyPair, EcdsaSigningAlgorithm, Ed25519KeyPair,
    RsaKeyPair,
};
use once_cell::sync::OnceCell;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// ECDSA curve identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcdsaCurve {
    /// P-256 (secp256r1) curve
    P256,
    /// P-384 (secp384r1) curve
    P384,
    /// P-521 (secp521r1) curve
    P521,
}

impl EcdsaCurve {
    fn signing_algorithm(self) -> &'static EcdsaSigningAlgorithm {
        match self {
            EcdsaCurve::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
            EcdsaCurve::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
            EcdsaCurve::P521 => &ECDSA_P521_SHA512_FIXED_SIGNING,
        }
    }
}

/// Kind of key material an algorithm signs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyFamily {
    Symmetric,
    Rsa,
    Ecdsa(EcdsaCurve),
    Ed25519,
    Unsecured,
}

/// Intended use of a key, as in the JWK `use` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUse {
    /// Digital signatures (`"sig"`)
    Signature,
}

impl KeyUse {
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyUse::Signature => "sig",
        }
    }
}

/// Where the signing key comes from
#[derive(Clone)]
pub struct KeySource {
    path: PathBuf,
    passphrase: Zeroizing<String>,
}

impl KeySource {
    /// Key file without passphrase
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            passphrase: Zeroizing::new(String::new()),
        }
    }

    /// Passphrase used to decrypt an encrypted key file
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Zeroizing::new(passphrase.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_display(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource")
            .field("path", &self.path)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Parsed key material
pub(crate) enum KeyMaterial {
    Symmetric(Zeroizing<Vec<u8>>),
    Rsa(RsaKeyPair),
    Ecdsa(EcdsaKeyPair, EcdsaCurve),
    Ed25519(Ed25519KeyPair),
    Unsecured,
}

/// Resolved signing key, tagged with its intended use
///
/// Handles are created by [`KeyProvider::get_key`] and are immutable.
pub struct KeyHandle {
    material: KeyMaterial,
    key_use: KeyUse,
}

impl KeyHandle {
    fn signing(material: KeyMaterial) -> Self {
        Self {
            material,
            key_use: KeyUse::Signature,
        }
    }

    pub(crate) fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn key_use(&self) -> KeyUse {
        self.key_use
    }

    /// Get key type name for error messages
    pub fn key_type(&self) -> &'static str {
        match &self.material {
            KeyMaterial::Symmetric(_) => "Symmetric",
            KeyMaterial::Rsa(_) => "RSA",
            KeyMaterial::Ecdsa(_, EcdsaCurve::P256) => "ECDSA P-256",
            KeyMaterial::Ecdsa(_, EcdsaCurve::P384) => "ECDSA P-384",
            KeyMaterial::Ecdsa(_, EcdsaCurve::P521) => "ECDSA P-521",
            KeyMaterial::Ed25519(_) => "Ed25519",
            KeyMaterial::Unsecured => "None",
        }
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("key_type", &self.key_type())
            .field("use", &self.key_use.as_str())
            .finish()
    }
}

/// Lazily resolved, memoized signing key
///
/// The key file is read and parsed on the first call to [`get_key`](Self::get_key).
/// Concurrent first calls are serialized by a one-time initialization cell, so
/// the file is parsed at most once per successful resolution. A failed
/// resolution is not cached and the next call tries again.
pub struct KeyProvider {
    source: KeySource,
    algorithm: AlgorithmType,
    key: OnceCell<KeyHandle>,
}

impl KeyProvider {
    /// Create a provider resolving keys for `algorithm`
    pub fn new(source: KeySource, algorithm: AlgorithmType) -> Self {
        Self {
            source,
            algorithm,
            key: OnceCell::new(),
        }
    }

    /// Get the signing key, resolving it on first use
    pub fn get_key(&self) -> Result<&KeyHandle> {
        self.key.get_or_try_init(|| self.load())
    }

    /// Whether the key has already been resolved
    pub fn is_resolved(&self) -> bool {
        self.key.get().is_some()
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    fn load(&self) -> Result<KeyHandle> {
        let family = self.algorithm.key_family();
        if family == KeyFamily::Unsecured {
            return Ok(KeyHandle::signing(KeyMaterial::Unsecured));
        }

        let bytes = self.read_key_file()?;
        let material = match family {
            KeyFamily::Symmetric => {
                if bytes.is_empty() {
                    return Err(self.invalid("shared secret is empty"));
                }
                KeyMaterial::Symmetric(bytes)
            }
            KeyFamily::Rsa => {
                let parsed = match self.decode(&bytes)? {
                    PrivateKeyDer::Pkcs8(der) => RsaKeyPair::from_pkcs8(&der),
                    PrivateKeyDer::Pkcs1(der) => RsaKeyPair::from_der(&der),
                    other => return Err(self.wrong_format(&other)),
                };
                parsed
                    .map(KeyMaterial::Rsa)
                    .map_err(|e| self.invalid(format!("RSA key rejected: {e}")))?
            }
            KeyFamily::Ecdsa(curve) => {
                let algorithm = curve.signing_algorithm();
                let parsed = match self.decode(&bytes)? {
                    PrivateKeyDer::Pkcs8(der) => EcdsaKeyPair::from_pkcs8(algorithm, &der),
                    PrivateKeyDer::Sec1(der) => EcdsaKeyPair::from_private_key_der(algorithm, &der),
                    other => return Err(self.wrong_format(&other)),
                };
                parsed
                    .map(|pair| KeyMaterial::Ecdsa(pair, curve))
                    .map_err(|e| self.invalid(format!("ECDSA {curve:?} key rejected: {e}")))?
            }
            KeyFamily::Ed25519 => match self.decode(&bytes)? {
                PrivateKeyDer::Pkcs8(der) => Ed25519KeyPair::from_pkcs8_maybe_unchecked(&der)
                    .map(KeyMaterial::Ed25519)
                    .map_err(|e| self.invalid(format!("Ed25519 key rejected: {e}")))?,
                other => return Err(self.wrong_format(&other)),
            },
            KeyFamily::Unsecured => KeyMaterial::Unsecured,
        };

        let handle = KeyHandle::signing(material);
        tracing::debug!(
            path = %self.source.path.display(),
            algorithm = %self.algorithm,
            key_type = handle.key_type(),
            "resolved signing key"
        );
        Ok(handle)
    }

    fn read_key_file(&self) -> Result<Zeroizing<Vec<u8>>> {
        let unreadable = |reason: String| Error::KeyUnreadable {
            path: self.source.path_display(),
            reason,
        };

        let file = std::fs::File::open(&self.source.path).map_err(|e| unreadable(e.to_string()))?;
        let mut bytes = Zeroizing::new(Vec::new());
        file.take(MAX_KEY_FILE_SIZE + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| unreadable(e.to_string()))?;

        if bytes.len() as u64 > MAX_KEY_FILE_SIZE {
            return Err(unreadable(format!(
                "file exceeds {MAX_KEY_FILE_SIZE} bytes"
            )));
        }
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<PrivateKeyDer> {
        decode_private_key(bytes, &self.source.passphrase).map_err(|e| match e {
            DecodeError::Malformed(reason) => self.invalid(reason),
            DecodeError::Passphrase => Error::KeyPassphraseInvalid {
                path: self.source.path_display(),
            },
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::KeyInvalid {
            path: self.source.path_display(),
            reason: reason.into(),
        }
    }

    fn wrong_format(&self, der: &PrivateKeyDer) -> Error {
        self.invalid(format!(
            "{} keys cannot be used with {}",
            der.format(),
            self.algorithm
        ))
    }
}

impl fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyProvider")
            .field("source", &self.source)
            .field("algorithm", &self.algorithm)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
