//! Key fixtures shared by the integration tests
//!
//! RSA keys are generated once per test binary with the `rsa` crate; ECDSA
//! and Ed25519 keys come from aws-lc-rs. Everything is written into a
//! temporary directory that lives as long as the [`KeyDir`].

#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, EcdsaSigningAlgorithm, Ed25519KeyPair, KeyPair};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use pem_rfc7468::LineEnding;
use rsa::RsaPrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use std::io::Write;
use std::sync::OnceLock;

pub const SHARED_SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Temporary directory holding key files
pub struct KeyDir {
    dir: tempfile::TempDir,
}

impl KeyDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Write a key file and return its path
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> String {
        let path = self.dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("failed to create key file");
        file.write_all(contents.as_ref())
            .expect("failed to write key file");
        path.display().to_string()
    }

    pub fn missing(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }
}

// ============================================================================
// RSA
// ============================================================================

/// 2048-bit RSA key, generated once per test binary
pub fn rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate RSA key")
    })
}

pub fn rsa_pkcs8_pem() -> String {
    rsa_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("failed to encode PKCS#8")
        .to_string()
}

pub fn rsa_pkcs8_der() -> Vec<u8> {
    rsa_key()
        .to_pkcs8_der()
        .expect("failed to encode PKCS#8")
        .as_bytes()
        .to_vec()
}

pub fn rsa_pkcs1_pem() -> String {
    rsa_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("failed to encode PKCS#1")
        .to_string()
}

pub fn rsa_public_pem() -> String {
    rsa_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("failed to encode public key")
}

/// PBES2 (PBKDF2-SHA256, AES-256-CBC) encrypted PKCS#8 DER
pub fn encrypt_pkcs8_der(der: &[u8], passphrase: &str) -> Vec<u8> {
    use pkcs8::PrivateKeyInfo;
    use pkcs8::pkcs5::pbes2;

    let salt = [7u8; 16];
    let iv = [9u8; 16];
    let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(2048, &salt, &iv)
        .expect("invalid PBES2 parameters");

    PrivateKeyInfo::try_from(der)
        .expect("invalid PKCS#8 document")
        .encrypt_with_params(params, passphrase)
        .expect("failed to encrypt key")
        .as_bytes()
        .to_vec()
}

/// PBES2 encrypted PKCS#8 PEM
pub fn encrypt_pkcs8(der: &[u8], passphrase: &str) -> String {
    pem("ENCRYPTED PRIVATE KEY", &encrypt_pkcs8_der(der, passphrase))
}

// ============================================================================
// ECDSA / EdDSA
// ============================================================================

/// Generated key pair as (PKCS#8 DER, raw public key)
pub struct GeneratedKey {
    pub pkcs8: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl GeneratedKey {
    pub fn pkcs8_pem(&self) -> String {
        pem("PRIVATE KEY", &self.pkcs8)
    }

    /// Inner SEC1 `ECPrivateKey` of an ECDSA key
    pub fn sec1_pem(&self) -> String {
        let info = pkcs8::PrivateKeyInfo::try_from(self.pkcs8.as_slice())
            .expect("invalid PKCS#8 document");
        pem("EC PRIVATE KEY", info.private_key)
    }
}

pub fn ecdsa_key(algorithm: &'static EcdsaSigningAlgorithm) -> GeneratedKey {
    let rng = SystemRandom::new();
    let document = EcdsaKeyPair::generate_pkcs8(algorithm, &rng).expect("failed to generate key");
    let pair = EcdsaKeyPair::from_pkcs8(algorithm, document.as_ref()).expect("invalid key");
    GeneratedKey {
        pkcs8: document.as_ref().to_vec(),
        public_key: pair.public_key().as_ref().to_vec(),
    }
}

pub fn ed25519_key() -> GeneratedKey {
    let rng = SystemRandom::new();
    let document = Ed25519KeyPair::generate_pkcs8(&rng).expect("failed to generate key");
    let pair = Ed25519KeyPair::from_pkcs8_maybe_unchecked(document.as_ref()).expect("invalid key");
    GeneratedKey {
        pkcs8: document.as_ref().to_vec(),
        public_key: pair.public_key().as_ref().to_vec(),
    }
}

pub fn pem(label: &str, der: &[u8]) -> String {
    pem_rfc7468::encode_string(label, LineEnding::LF, der).expect("failed to encode PEM")
}

// ============================================================================
// Token inspection
// ============================================================================

pub struct TokenParts {
    pub header: serde_json::Value,
    pub payload: serde_json::Value,
    pub signing_input: String,
    pub signature: Vec<u8>,
}

pub fn split_token(token: &str) -> TokenParts {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token must have three parts: {token}");

    let decode_json = |part: &str| -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(part).expect("invalid base64url");
        serde_json::from_slice(&bytes).expect("invalid JSON")
    };

    TokenParts {
        header: decode_json(parts[0]),
        payload: decode_json(parts[1]),
        signing_input: format!("{}.{}", parts[0], parts[1]),
        signature: URL_SAFE_NO_PAD
            .decode(parts[2])
            .expect("invalid base64url signature"),
    }
}
