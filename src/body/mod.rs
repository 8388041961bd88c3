//! # Request Body Extraction
//!
//! Locates the PEM CSR string inside the JSON request body. The field name
//! depends on which signing backend sits behind the gateway: Crypki expects
//! `{"csr": "..."}`, CFSSL expects `{"certificate_request": "..."}`.

use serde_json::Value;

use crate::config::SignerBackend;
use crate::errors::{Result, ValidationError};

/// Extract the PEM CSR text from a buffered request body.
///
/// The body must be a JSON object carrying a non-empty string in the
/// backend-specific field; the string is returned unchanged.
pub fn extract_csr_pem(body: &[u8], signer: SignerBackend) -> Result<String> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::InvalidJson)?;
    let object = value.as_object().ok_or(ValidationError::InvalidJson)?;

    let field = signer.csr_field();
    match object.get(field).and_then(Value::as_str) {
        Some(pem) if !pem.is_empty() => Ok(pem.to_string()),
        _ => Err(ValidationError::MissingCsrField { field }),
    }
}
