use crate::algorithm::AlgorithmType;
use crate::claims::{ClaimsBuilder, ClaimsSet, ExtensionClaims, SubjectId, current_timestamp};
use crate::config::SignerConfig;
use crate::error::Result;
use crate::header::TokenHeader;
use crate::keys::{KeyHandle, KeyProvider};
use crate::utils::base64url;
use aws_lc_rs::rand::SystemRandom;

/// JWT token signer
///
/// The signer is configured once and can be shared (for example behind an
/// `Arc`) to issue any number of tokens. The signing key is read from disk on
/// the first call to [`generate`](Self::generate) and reused afterwards.
///
/// # Unknown algorithm names
///
/// Unless strict algorithm resolution is enabled on the [`SignerConfig`], an
/// unrecognized algorithm name does not fail construction. It resolves to
/// [`AlgorithmType::None`] and every token is issued unsigned.
pub struct TokenSigner {
    config: SignerConfig,
    algorithm: AlgorithmType,
    keys: KeyProvider,
    rng: SystemRandom,
}

impl TokenSigner {
    /// Create a signer, resolving the algorithm name
    ///
    /// No file is read here; key problems surface on first use.
    pub fn new(config: SignerConfig) -> Result<Self> {
        let algorithm = if config.is_strict_algorithm() {
            AlgorithmType::resolve_strict(config.algorithm())?
        } else {
            AlgorithmType::resolve(config.algorithm())
        };

        if !algorithm.is_unsecured() {
            config.validate()?;
        }

        let keys = KeyProvider::new(config.key_source(), algorithm);
        Ok(Self {
            config,
            algorithm,
            keys,
            rng: SystemRandom::new(),
        })
    }

    /// The resolved signing algorithm
    pub fn algorithm(&self) -> AlgorithmType {
        self.algorithm
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn key_provider(&self) -> &KeyProvider {
        &self.keys
    }

    /// Issue a signed token
    ///
    /// `iat` and `nbf` are the current time and `exp` lies the configured
    /// expiration after it. Returns the compact `header.payload.signature`
    /// serialization.
    pub fn generate<S, I>(
        &self,
        issuer: &str,
        subject: impl Into<SubjectId>,
        name: Option<&str>,
        scopes: I,
        extensions: &ExtensionClaims,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = self.keys.get_key()?;

        let subject = subject.into();
        let claims = ClaimsBuilder::new(issuer, subject.clone())
            .name(name)
            .scopes(scopes)
            .extensions(extensions.clone())
            .algorithm(self.config.algorithm())
            .expires_in(self.config.expiration_seconds())
            .build(current_timestamp())?;

        let token = self.sign_with(&claims, key)?;
        tracing::debug!(
            algorithm = %self.algorithm,
            issuer,
            subject = %subject,
            "issued token"
        );
        Ok(token)
    }

    /// Sign a pre-built claims set
    pub fn sign_claims(&self, claims: &ClaimsSet) -> Result<String> {
        let key = self.keys.get_key()?;
        self.sign_with(claims, key)
    }

    fn sign_with(&self, claims: &ClaimsSet, key: &KeyHandle) -> Result<String> {
        let header = TokenHeader::new(self.algorithm, self.config.key_id().map(str::to_string));
        let signing_input = format!(
            "{}.{}",
            base64url::encode(&header.to_json()),
            base64url::encode(&claims.to_json())
        );

        let signature = self
            .algorithm
            .sign(signing_input.as_bytes(), key, &self.rng)?;

        Ok(format!(
            "{signing_input}.{}",
            base64url::encode_bytes(&signature)
        ))
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.algorithm)
            .field("keys", &self.keys)
            .finish()
    }
}
