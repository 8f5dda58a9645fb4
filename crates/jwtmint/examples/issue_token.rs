//! Run with
//!
//! ```not_rust
//! cargo run --example issue_token -- signer.json alice read write
//! ```
//!
//! `signer.json` holds `jwtAlgo`, `privateKeyPath`, `accessTokenExpiration`
//! and optionally `privateKeyPassPhrase`, `keyId` and `strictAlgorithm`.

use jwtmint::{ExtensionClaims, SignerConfig, TokenSigner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwtmint=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(config_path), Some(subject)) = (args.next(), args.next()) else {
        eprintln!("usage: issue_token <config.json> <subject> [scope...]");
        std::process::exit(2);
    };
    let scopes: Vec<String> = args.collect();

    let result = SignerConfig::from_file(&config_path)
        .and_then(TokenSigner::new)
        .and_then(|signer| {
            signer.generate(
                "jwtmint-example",
                subject,
                None,
                &scopes,
                &ExtensionClaims::new(),
            )
        });

    match result {
        Ok(token) => println!("{token}"),
        Err(e) => {
            tracing::error!(error = %e, "failed to issue token");
            std::process::exit(1);
        }
    }
}
