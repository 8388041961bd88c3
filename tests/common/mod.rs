//! Common test utilities for the integration tests.
//!
//! Provides a recording mock host, on-the-fly CSR generation via rcgen, and
//! bearer-token builders (both unsigned and HS256-signed).

#![allow(dead_code)]

use std::net::IpAddr;

use certsigner_filter::filter::{BodyOps, ConnectionOps, HeaderOps, ResponseOps};
use certsigner_filter::identity::encode_claims;
use rcgen::{CertificateParams, DnType, Ia5String, KeyPair, SanType};
use serde_json::{Map, Value};

/// A synthetic response recorded by the mock host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SentResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// In-memory stand-in for the proxy host, recording every side effect the
/// filter drives.
#[derive(Debug, Default)]
pub struct MockHost {
    pub request_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub source_address: Option<String>,
    pub sent_response: Option<SentResponse>,
    pub response_headers: Vec<(String, String)>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authorization(mut self, value: &str) -> Self {
        self.request_headers.push(("authorization".to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_source_address(mut self, addr: &str) -> Self {
        self.source_address = Some(addr.to_string());
        self
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

impl HeaderOps for MockHost {
    fn request_header(&self, name: &str) -> Option<String> {
        self.request_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn send_response(&mut self, status: u16, headers: &[(&str, &str)], body: &[u8]) {
        self.sent_response = Some(SentResponse {
            status,
            headers: headers.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect(),
            body: body.to_vec(),
        });
    }
}

impl BodyOps for MockHost {
    fn request_body(&self, start: usize, len: usize) -> Option<Vec<u8>> {
        self.body.get(start..start.checked_add(len)?).map(<[u8]>::to_vec)
    }
}

impl ResponseOps for MockHost {
    fn add_response_header(&mut self, name: &str, value: &str) {
        self.response_headers.push((name.to_string(), value.to_string()));
    }
}

impl ConnectionOps for MockHost {
    fn source_address(&self) -> Option<String> {
        self.source_address.clone()
    }
}

/// SAN entries to attach to a generated CSR.
#[derive(Debug, Default)]
pub struct SanEntries {
    pub dns: Vec<String>,
    pub email: Vec<String>,
    pub ip: Vec<IpAddr>,
}

impl SanEntries {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn dns(name: &str) -> Self {
        Self { dns: vec![name.to_string()], ..Self::default() }
    }

    pub fn email(addr: &str) -> Self {
        Self { email: vec![addr.to_string()], ..Self::default() }
    }

    pub fn ip(addr: IpAddr) -> Self {
        Self { ip: vec![addr], ..Self::default() }
    }
}

/// Generate a PEM-encoded PKCS#10 CSR with the given CN and SAN entries.
pub fn csr_pem(common_name: &str, sans: SanEntries) -> String {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, common_name);
    for dns in &sans.dns {
        params
            .subject_alt_names
            .push(SanType::DnsName(Ia5String::try_from(dns.as_str()).expect("dns san")));
    }
    for email in &sans.email {
        params
            .subject_alt_names
            .push(SanType::Rfc822Name(Ia5String::try_from(email.as_str()).expect("email san")));
    }
    for ip in &sans.ip {
        params.subject_alt_names.push(SanType::IpAddress(*ip));
    }

    let key_pair = KeyPair::generate().expect("generate key pair");
    params.serialize_request(&key_pair).expect("serialize csr").pem().expect("pem encode csr")
}

/// Crypki-shaped request body wrapping the given PEM text.
pub fn crypki_body(pem: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "csr": pem })).expect("crypki body")
}

/// CFSSL-shaped request body wrapping the given PEM text.
pub fn cfssl_body(pem: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "certificate_request": pem })).expect("cfssl body")
}

/// Unsigned bearer header for a single string claim.
pub fn bearer_with_claim(claim: &str, value: &str) -> String {
    let mut claims = Map::new();
    claims.insert(claim.to_string(), Value::String(value.to_string()));
    format!("Bearer {}", encode_claims(&claims))
}

/// HS256-signed bearer header. The filter must extract the claim without
/// looking at the signature.
pub fn signed_bearer_with_claim(claim: &str, value: &str) -> String {
    let mut claims = Map::new();
    claims.insert(claim.to_string(), Value::String(value.to_string()));
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"integration-test-secret"),
    )
    .expect("sign token");
    format!("Bearer {token}")
}
