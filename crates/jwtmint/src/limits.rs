//! Size limit constants for input validation

/// Maximum size for a signing key file (64KB)
/// PEM-encoded RSA-8192 private keys stay well below 8KB
pub(crate) const MAX_KEY_FILE_SIZE: u64 = 64 * 1024;

/// Maximum size for a JSON signer configuration file (64KB)
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;
