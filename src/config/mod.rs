//! # Filter Configuration
//!
//! Loads and validates the process-wide plugin configuration. The host hands
//! the filter a JSON blob once at startup:
//!
//! ```json
//! {
//!   "claim": "sub",
//!   "user_prefix": "user.",
//!   "signer": "crypki"
//! }
//! ```
//!
//! Configuration problems are fatal: the filter refuses to initialize rather
//! than run with a partial policy. The resulting [`FilterConfig`] is
//! immutable and shared read-only by every exchange.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

use crate::errors::ConfigError;

/// Certificate signing backend sitting behind the gateway.
///
/// The backend determines which JSON field of the request body carries the
/// PEM-encoded CSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerBackend {
    Crypki,
    Cfssl,
}

impl SignerBackend {
    /// Request-body field holding the PEM CSR for this backend.
    pub fn csr_field(&self) -> &'static str {
        match self {
            SignerBackend::Crypki => "csr",
            SignerBackend::Cfssl => "certificate_request",
        }
    }
}

impl std::fmt::Display for SignerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerBackend::Crypki => write!(f, "crypki"),
            SignerBackend::Cfssl => write!(f, "cfssl"),
        }
    }
}

/// Process-wide filter configuration, immutable after startup.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FilterConfig {
    /// Token claim holding the caller identity
    #[validate(length(min = 1, message = "claim must not be empty"))]
    pub claim: String,

    /// Prefix prepended to the identity before comparing with the CSR CN
    #[validate(length(min = 1, message = "user_prefix must not be empty"))]
    pub user_prefix: String,

    /// Signing backend, selects the CSR field in the request body
    pub signer: SignerBackend,
}

impl FilterConfig {
    /// Parse and validate the plugin configuration blob.
    ///
    /// String values are whitespace-trimmed before validation. Any failure
    /// must abort initialization; there is no fallback configuration.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let mut config: FilterConfig = serde_json::from_slice(data).map_err(|e| {
            error!(
                error = %e,
                r#"Invalid configuration; expected {{"claim": "...", "user_prefix": "...", "signer": "crypki"|"cfssl"}}"#
            );
            ConfigError::Parse(e)
        })?;

        config.claim = config.claim.trim().to_string();
        config.user_prefix = config.user_prefix.trim().to_string();

        config.validate().map_err(|e| {
            error!(error = %e, "Invalid configuration");
            ConfigError::Invalid(e)
        })?;

        info!(
            claim = %config.claim,
            user_prefix = %config.user_prefix,
            signer = %config.signer,
            "Certificate signer filter configured"
        );

        Ok(config)
    }
}
