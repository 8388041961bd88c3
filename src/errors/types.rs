//! # Validation Error Types
//!
//! Every way an exchange can be rejected, with the HTTP status and the
//! plain-text body used for the synthetic rejection response. The first
//! failure is terminal for its exchange; there is no transient class and
//! nothing is retried.

use std::fmt;
use std::net::IpAddr;

/// Subject Alternative Name categories that the policy forbids outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanKind {
    Dns,
    Email,
}

impl fmt::Display for SanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanKind::Dns => write!(f, "dns"),
            SanKind::Email => write!(f, "email"),
        }
    }
}

/// Main error type for request validation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `Authorization` header absent or missing the `Bearer` prefix
    #[error("Invalid authorization header")]
    AuthHeader,

    /// Token structure, base64url payload, or payload JSON is broken
    #[error("Invalid JWT")]
    MalformedToken,

    /// The configured claim is absent, empty, or not a string
    #[error("No {claim} claim in JWT")]
    ClaimMissing { claim: String },

    /// The host could not hand back the buffered request body
    #[error("Failed to read body")]
    BodyRead,

    /// Request body is not a JSON object
    #[error("Invalid JSON")]
    InvalidJson,

    /// The backend-specific CSR field is absent, non-string, or empty
    #[error("Missing CSR in JSON: expected field '{field}'")]
    MissingCsrField { field: &'static str },

    /// No PEM block, or a block with the wrong label
    #[error("Invalid PEM CSR")]
    InvalidPem,

    /// Structurally malformed PKCS#10 DER
    #[error("Failed to parse CSR: {detail}")]
    CsrParse { detail: String },

    /// `user_prefix + identity` does not equal the CSR Common Name
    #[error(
        "The name {identity} does not match CSR CN: expected '{expected_cn}', got '{actual_cn}'"
    )]
    IdentityMismatch { identity: String, expected_cn: String, actual_cn: String },

    /// The CSR requests DNS or email subject alternative names
    #[error("CSR must not request {kind} subject alternative names")]
    ForbiddenSanType { kind: SanKind },

    /// An IP SAN entry differs from the client's transport source address
    #[error("CSR IP SAN {actual} does not match client address {expected}")]
    ForbiddenSanIp { expected: IpAddr, actual: IpAddr },

    /// IP SANs are present but the client address is missing or unparsable
    #[error("Client address missing or invalid while CSR requests IP subject alternative names")]
    InvalidClientAddress,
}

impl ValidationError {
    /// HTTP status for the synthetic rejection response.
    ///
    /// 401 for authentication-shaped problems, 400 for structurally broken
    /// requests, 403 for policy violations.
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::AuthHeader => 401,
            ValidationError::MalformedToken => 401,
            ValidationError::ClaimMissing { .. } => 403,
            ValidationError::BodyRead => 400,
            ValidationError::InvalidJson => 400,
            ValidationError::MissingCsrField { .. } => 400,
            ValidationError::InvalidPem => 400,
            ValidationError::CsrParse { .. } => 400,
            ValidationError::IdentityMismatch { .. } => 403,
            ValidationError::ForbiddenSanType { .. } => 403,
            ValidationError::ForbiddenSanIp { .. } => 403,
            ValidationError::InvalidClientAddress => 403,
        }
    }

    /// Plain-text body of the synthetic rejection response.
    pub fn response_body(&self) -> String {
        self.to_string()
    }
}

/// Decision recorded once per exchange and read when annotating the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Success,
    Failure(ValidationError),
}

impl ValidationOutcome {
    /// Value of the outcome header added to every response.
    pub fn as_header_value(&self) -> &'static str {
        match self {
            ValidationOutcome::Success => "success",
            ValidationOutcome::Failure(_) => "failure",
        }
    }
}
