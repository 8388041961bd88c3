//! # CSR Decoding
//!
//! Parses a PEM-wrapped PKCS#10 certification request into the identity
//! fields the policy engine cares about: the Subject Common Name and the
//! DNS / email / IP entries of the requested Subject Alternative Name
//! extension. Everything else in the request (public key info, other
//! attributes, the self-signature) is opaque.
//!
//! The input is attacker-supplied. Parsing is fully delegated to
//! `x509-parser`; every structural violation surfaces as a typed error and
//! must never take the process down.

use std::net::IpAddr;

use tracing::debug;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::errors::{Result, ValidationError};

/// PEM label required on the envelope.
const CSR_PEM_LABEL: &str = "CERTIFICATE REQUEST";

/// The subset of a PKCS#10 request relevant to identity binding.
///
/// Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedCsr {
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

/// Decode a PEM-encoded PKCS#10 certification request.
///
/// The envelope must be a single PEM block labeled `CERTIFICATE REQUEST`.
pub fn decode_csr_pem(input: &[u8]) -> Result<DecodedCsr> {
    let (_, pem) = parse_x509_pem(input).map_err(|_| ValidationError::InvalidPem)?;
    if pem.label != CSR_PEM_LABEL {
        return Err(ValidationError::InvalidPem);
    }
    decode_csr_der(&pem.contents)
}

/// Decode a DER-encoded PKCS#10 certification request.
pub fn decode_csr_der(der: &[u8]) -> Result<DecodedCsr> {
    let (rem, request) = X509CertificationRequest::from_der(der)
        .map_err(|e| ValidationError::CsrParse { detail: e.to_string() })?;
    if !rem.is_empty() {
        return Err(ValidationError::CsrParse {
            detail: "trailing data after certification request".to_string(),
        });
    }

    // A missing CN decodes as the empty string and is rejected later by the
    // binding check, mirroring how an absent pkix CommonName behaves.
    let common_name = request
        .certification_request_info
        .subject
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut csr = DecodedCsr { common_name, ..DecodedCsr::default() };

    if let Some(extensions) = request.requested_extensions() {
        for extension in extensions {
            if let ParsedExtension::SubjectAlternativeName(san) = extension {
                for name in &san.general_names {
                    match name {
                        GeneralName::DNSName(dns) => csr.dns_names.push(dns.to_string()),
                        GeneralName::RFC822Name(email) => {
                            csr.email_addresses.push(email.to_string())
                        }
                        GeneralName::IPAddress(octets) => {
                            csr.ip_addresses.push(ip_from_octets(octets)?)
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    debug!(
        common_name = %csr.common_name,
        dns_sans = csr.dns_names.len(),
        email_sans = csr.email_addresses.len(),
        ip_sans = csr.ip_addresses.len(),
        "Decoded certificate signing request"
    );

    Ok(csr)
}

/// An iPAddress general name is raw network-order octets: 4 for IPv4, 16 for
/// IPv6. Anything else is a malformed request.
fn ip_from_octets(octets: &[u8]) -> Result<IpAddr> {
    match octets.len() {
        4 => {
            let bytes: [u8; 4] = octets.try_into().map_err(|_| ValidationError::CsrParse {
                detail: "invalid IPv4 SAN".to_string(),
            })?;
            Ok(IpAddr::from(bytes))
        }
        16 => {
            let bytes: [u8; 16] = octets.try_into().map_err(|_| ValidationError::CsrParse {
                detail: "invalid IPv6 SAN".to_string(),
            })?;
            Ok(IpAddr::from(bytes))
        }
        n => Err(ValidationError::CsrParse { detail: format!("IP SAN with {n} octets") }),
    }
}
