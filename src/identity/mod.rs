//! # Identity Extraction
//!
//! Decodes the caller identity from the `Authorization` bearer token. The
//! token is parsed, never verified: signature validation is the job of the
//! upstream JWT filter, and by the time this filter runs the token is
//! trusted. Only the payload segment is decoded, and only the single
//! configured claim is read from it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Result, ValidationError};

/// Caller identity resolved from the bearer token for one exchange.
///
/// Created when request headers are processed, read once when the body
/// completes, and dropped with the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    /// Claim the identity was taken from
    pub claim_name: String,
    /// The identity value itself
    pub identity: String,
}

/// Extract the caller identity from a raw `Authorization` header value.
///
/// The header must start with `Bearer ` (case-insensitive); the remainder is
/// treated as a compact dot-separated token whose second segment is a
/// base64url (unpadded) JSON claims object.
pub fn extract_identity(auth_header: Option<&str>, claim: &str) -> Result<RequestIdentity> {
    let auth = auth_header.ok_or(ValidationError::AuthHeader)?;

    // Byte-range get() instead of slicing: a multi-byte prefix must fail
    // cleanly, not panic on a char boundary.
    let prefix_ok = auth.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("bearer "));
    if !prefix_ok {
        return Err(ValidationError::AuthHeader);
    }
    let token = auth[7..].trim();

    let claims = decode_claims(token)?;
    match string_claim(&claims, claim) {
        Some(identity) => {
            debug!(claim, identity, "Extracted caller identity from bearer token");
            Ok(RequestIdentity { claim_name: claim.to_string(), identity: identity.to_string() })
        }
        None => Err(ValidationError::ClaimMissing { claim: claim.to_string() }),
    }
}

/// Decode the payload segment of a compact token into a claims object.
///
/// The signature segment is ignored entirely.
pub fn decode_claims(token: &str) -> Result<Map<String, Value>> {
    let mut segments = token.split('.');
    let _header = segments.next();
    let payload = segments.next().ok_or(ValidationError::MalformedToken)?;

    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| ValidationError::MalformedToken)?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|_| ValidationError::MalformedToken)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::MalformedToken),
    }
}

/// Typed accessor for a single string claim.
///
/// Returns `None` when the claim is absent, empty, or not a string; no other
/// assumption is made about the shape of the claims object.
pub fn string_claim<'a>(claims: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    claims.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Build an unsigned compact token carrying the given claims.
///
/// The counterpart of [`decode_claims`], used to construct test tokens; the
/// signature segment is left empty, which the extractor must accept.
pub fn encode_claims(claims: &Map<String, Value>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(Value::Object(claims.clone()).to_string());
    format!("{header}.{payload}.")
}
