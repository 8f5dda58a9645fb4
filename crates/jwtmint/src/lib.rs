//! A minimal JWT issuing library.
//!
//! ```no_run
//! use jwtmint::{ExtensionClaims, SignerConfig, TokenSigner};
//!
//! # fn main() -> jwtmint::Result<()> {
//! let signer = TokenSigner::new(SignerConfig::new("RS256", "/etc/issuer/private.pem", 3600))?;
//! let token = signer.generate(
//!     "https://issuer.example",
//!     555,
//!     Some("Jane Doe"),
//!     ["read", "write"],
//!     &ExtensionClaims::new().with("tenant", "acme"),
//! )?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

mod error;

// Internal modules
pub(crate) mod algorithm;
pub(crate) mod claims;
pub(crate) mod config;
pub(crate) mod header;
pub(crate) mod keys;
pub(crate) mod signer;
pub(crate) mod utils;

// Public Interface
pub use algorithm::AlgorithmType;
pub use claims::{ClaimValue, ClaimsBuilder, ClaimsSet, ExtensionClaims, RESERVED_CLAIMS, SubjectId};
pub use config::SignerConfig;
pub use error::{Error, Result};
pub use keys::{EcdsaCurve, KeyHandle, KeyProvider, KeySource, KeyUse};
pub use signer::TokenSigner;

pub(crate) mod limits;
