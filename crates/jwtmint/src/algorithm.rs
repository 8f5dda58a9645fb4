//! Algorithm support for JWT signing
use crate::error::{Error, Result};
use crate::keys::{EcdsaCurve, KeyFamily, KeyHandle, KeyMaterial};

use aws_lc_rs::hmac;
use aws_lc_rs::rand::SecureRandom;
use aws_lc_rs::signature::{self, EcdsaKeyPair, RsaEncoding, RsaKeyPair};

/// Signing algorithm, resolved once from its configured name
///
/// # Unknown names
///
/// [`AlgorithmType::resolve`] never fails: any name outside the thirteen
/// supported identifiers resolves to [`AlgorithmType::None`], which produces
/// unsecured tokens with an empty signature. A typo in the configured name
/// therefore yields tokens no verifier should accept. Enable
/// [`SignerConfig::with_strict_algorithm`](crate::SignerConfig::with_strict_algorithm)
/// to fail fast instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmType {
    EdDSA,
    ES256,
    ES384,
    ES512,
    HS256,
    HS384,
    HS512,
    PS256,
    PS384,
    PS512,
    RS256,
    RS384,
    RS512,
    /// No signature (`"none"`)
    None,
}

const SUPPORTED: [AlgorithmType; 13] = [
    AlgorithmType::EdDSA,
    AlgorithmType::ES256,
    AlgorithmType::ES384,
    AlgorithmType::ES512,
    AlgorithmType::HS256,
    AlgorithmType::HS384,
    AlgorithmType::HS512,
    AlgorithmType::PS256,
    AlgorithmType::PS384,
    AlgorithmType::PS512,
    AlgorithmType::RS256,
    AlgorithmType::RS384,
    AlgorithmType::RS512,
];

impl AlgorithmType {
    /// Resolve a configured algorithm name, falling back to [`AlgorithmType::None`]
    pub fn resolve(name: &str) -> Self {
        Self::lookup(name).unwrap_or_else(|| {
            if name != "none" {
                tracing::warn!(
                    algorithm = name,
                    "unrecognized signing algorithm, issuing unsecured tokens"
                );
            }
            AlgorithmType::None
        })
    }

    /// Resolve a configured algorithm name, rejecting unknown names and `"none"`
    pub fn resolve_strict(name: &str) -> Result<Self> {
        match Self::lookup(name) {
            Some(algorithm) => Ok(algorithm),
            None if name == "none" => Err(Error::AlgorithmNoneRejected),
            None => Err(Error::AlgorithmUnsupported(name.into())),
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        SUPPORTED
            .iter()
            .find(|algorithm| algorithm.as_str() == name)
            .copied()
    }

    /// The thirteen algorithms that produce a signature
    pub fn all() -> &'static [AlgorithmType] {
        &SUPPORTED
    }

    /// Convert to string representation, as written to the `alg` header
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::EdDSA => "EdDSA",
            AlgorithmType::ES256 => "ES256",
            AlgorithmType::ES384 => "ES384",
            AlgorithmType::ES512 => "ES512",
            AlgorithmType::HS256 => "HS256",
            AlgorithmType::HS384 => "HS384",
            AlgorithmType::HS512 => "HS512",
            AlgorithmType::PS256 => "PS256",
            AlgorithmType::PS384 => "PS384",
            AlgorithmType::PS512 => "PS512",
            AlgorithmType::RS256 => "RS256",
            AlgorithmType::RS384 => "RS384",
            AlgorithmType::RS512 => "RS512",
            AlgorithmType::None => "none",
        }
    }

    /// Check if algorithm is HMAC-based (symmetric)
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            AlgorithmType::HS256 | AlgorithmType::HS384 | AlgorithmType::HS512
        )
    }

    /// Check if tokens carry no signature
    pub fn is_unsecured(&self) -> bool {
        matches!(self, AlgorithmType::None)
    }

    pub(crate) fn key_family(&self) -> KeyFamily {
        match self {
            AlgorithmType::HS256 | AlgorithmType::HS384 | AlgorithmType::HS512 => {
                KeyFamily::Symmetric
            }
            AlgorithmType::RS256
            | AlgorithmType::RS384
            | AlgorithmType::RS512
            | AlgorithmType::PS256
            | AlgorithmType::PS384
            | AlgorithmType::PS512 => KeyFamily::Rsa,
            AlgorithmType::ES256 => KeyFamily::Ecdsa(EcdsaCurve::P256),
            AlgorithmType::ES384 => KeyFamily::Ecdsa(EcdsaCurve::P384),
            AlgorithmType::ES512 => KeyFamily::Ecdsa(EcdsaCurve::P521),
            AlgorithmType::EdDSA => KeyFamily::Ed25519,
            AlgorithmType::None => KeyFamily::Unsecured,
        }
    }

    /// Sign a message (the JWS signing input `header.payload`)
    ///
    /// ECDSA signatures use the fixed-length R||S encoding required by
    /// RFC 7518 Section 3.4, not ASN.1 DER.
    pub(crate) fn sign(
        &self,
        message: &[u8],
        key: &KeyHandle,
        rng: &dyn SecureRandom,
    ) -> Result<Vec<u8>> {
        match (self, key.material()) {
            (AlgorithmType::None, _) => Ok(Vec::new()),

            (AlgorithmType::HS256, KeyMaterial::Symmetric(secret)) => {
                Ok(sign_hmac(hmac::HMAC_SHA256, secret, message))
            }
            (AlgorithmType::HS384, KeyMaterial::Symmetric(secret)) => {
                Ok(sign_hmac(hmac::HMAC_SHA384, secret, message))
            }
            (AlgorithmType::HS512, KeyMaterial::Symmetric(secret)) => {
                Ok(sign_hmac(hmac::HMAC_SHA512, secret, message))
            }

            (AlgorithmType::RS256, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PKCS1_SHA256, rng, message)
            }
            (AlgorithmType::RS384, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PKCS1_SHA384, rng, message)
            }
            (AlgorithmType::RS512, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PKCS1_SHA512, rng, message)
            }
            (AlgorithmType::PS256, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PSS_SHA256, rng, message)
            }
            (AlgorithmType::PS384, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PSS_SHA384, rng, message)
            }
            (AlgorithmType::PS512, KeyMaterial::Rsa(pair)) => {
                self.sign_rsa(pair, &signature::RSA_PSS_SHA512, rng, message)
            }

            (AlgorithmType::ES256, KeyMaterial::Ecdsa(pair, EcdsaCurve::P256))
            | (AlgorithmType::ES384, KeyMaterial::Ecdsa(pair, EcdsaCurve::P384))
            | (AlgorithmType::ES512, KeyMaterial::Ecdsa(pair, EcdsaCurve::P521)) => {
                self.sign_ecdsa(pair, rng, message)
            }

            (AlgorithmType::EdDSA, KeyMaterial::Ed25519(pair)) => {
                Ok(pair.sign(message).as_ref().to_vec())
            }

            _ => Err(Error::KeyTypeMismatch {
                algorithm: self.to_string(),
                expected_key_type: self.expected_key_type().into(),
                actual_key_type: key.key_type().into(),
            }),
        }
    }

    fn sign_rsa(
        &self,
        pair: &RsaKeyPair,
        encoding: &'static dyn RsaEncoding,
        rng: &dyn SecureRandom,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let mut signature = vec![0u8; pair.public_modulus_len()];
        pair.sign(encoding, rng, message, &mut signature)
            .map_err(|e| self.signature_failed(e))?;
        Ok(signature)
    }

    fn sign_ecdsa(
        &self,
        pair: &EcdsaKeyPair,
        rng: &dyn SecureRandom,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        pair.sign(rng, message)
            .map(|signature| signature.as_ref().to_vec())
            .map_err(|e| self.signature_failed(e))
    }

    fn signature_failed(&self, reason: impl std::fmt::Display) -> Error {
        Error::SignatureFailed {
            algorithm: self.to_string(),
            reason: reason.to_string(),
        }
    }

    fn expected_key_type(&self) -> &'static str {
        match self.key_family() {
            KeyFamily::Symmetric => "Symmetric",
            KeyFamily::Rsa => "RSA",
            KeyFamily::Ecdsa(EcdsaCurve::P256) => "ECDSA P-256",
            KeyFamily::Ecdsa(EcdsaCurve::P384) => "ECDSA P-384",
            KeyFamily::Ecdsa(EcdsaCurve::P521) => "ECDSA P-521",
            KeyFamily::Ed25519 => "Ed25519",
            KeyFamily::Unsecured => "None",
        }
    }
}

fn sign_hmac(algorithm: hmac::Algorithm, secret: &[u8], message: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(algorithm, secret);
    hmac::sign(&key, message).as_ref().to_vec()
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AlgorithmType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
