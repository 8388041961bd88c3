//! # certsigner-filter
//!
//! Inline request-validation filter for an HTTP gateway fronting a
//! certificate-issuance backend (Crypki or CFSSL). For every certificate
//! signing request submitted through the gateway, the filter binds the
//! caller's already-authenticated bearer-token identity to the identity
//! asserted inside the CSR, and enforces a Subject Alternative Name policy
//! so the CSR cannot request extra identities.
//!
//! ## Architecture
//!
//! ```text
//! request headers → Identity Extractor ─┐
//! request body    → Body Extractor → CSR Decoder → Binding Validator
//!                                                        ↓
//! response headers ←──────────── outcome header ← decision
//! ```
//!
//! The [`filter::CsrBindingFilter`] state machine sequences these stages
//! against the host's streamed lifecycle events; the host is reached only
//! through the narrow capability traits in [`filter::host`].
//!
//! Deliberately out of scope: token signature verification (performed by an
//! upstream filter), TLS termination, certificate issuance, and any network
//! I/O of its own.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use certsigner_filter::{CsrBindingFilter, FilterConfig};
//!
//! # fn run(host: &mut dyn certsigner_filter::HostExchange) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(FilterConfig::from_json(
//!     br#"{"claim": "sub", "user_prefix": "user.", "signer": "crypki"}"#,
//! )?);
//!
//! // One filter instance per exchange; the host drives the events.
//! let mut filter = CsrBindingFilter::new(config);
//! filter.on_request_headers(host);
//! filter.on_request_body(host, 128, true);
//! filter.on_response_headers(host);
//! filter.on_stream_done();
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod csr;
pub mod errors;
pub mod filter;
pub mod identity;
pub mod policy;

// Re-export commonly used types
pub use config::{FilterConfig, SignerBackend};
pub use csr::DecodedCsr;
pub use errors::{ConfigError, SanKind, ValidationError, ValidationOutcome};
pub use filter::{CsrBindingFilter, ExchangeState, FilterAction, HostExchange, OUTCOME_HEADER};
pub use identity::RequestIdentity;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
