//! # Error Handling
//!
//! Error types for the certificate signer filter, defined with `thiserror`.
//! Per-exchange validation failures live in [`types::ValidationError`];
//! fatal startup problems are a separate [`ConfigError`] so that a bad
//! plugin configuration can never be confused with a rejectable request.

pub mod types;

pub use types::{SanKind, ValidationError, ValidationOutcome};

/// Custom result type for per-exchange validation stages
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Fatal configuration errors raised while loading the plugin configuration.
///
/// These abort filter initialization; they are never mapped to an HTTP
/// response because no exchange exists yet.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration blob was not the expected JSON object
    #[error("invalid plugin configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but violated a constraint
    #[error("invalid plugin configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
