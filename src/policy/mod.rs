//! # Binding Policy
//!
//! The accept/reject decision: binds the authenticated caller identity to the
//! identity asserted inside the CSR, and enforces that the SAN entries cannot
//! smuggle in extra identities. The checks are independent; their order only
//! determines which violation is reported first.

use std::net::{IpAddr, SocketAddr};

use tracing::debug;

use crate::csr::DecodedCsr;
use crate::errors::{Result, SanKind, ValidationError};

/// Validate the identity binding between caller and CSR.
///
/// * `prefix + identity` must equal the CSR Common Name exactly.
/// * DNS and email SANs are forbidden outright.
/// * IP SANs, when present, must all equal the client's transport source
///   address (`client_addr`, as reported by the host, possibly `ip:port`).
pub fn validate_binding(
    identity: &str,
    user_prefix: &str,
    csr: &DecodedCsr,
    client_addr: Option<&str>,
) -> Result<()> {
    let expected_cn = format!("{user_prefix}{identity}");
    if csr.common_name != expected_cn {
        return Err(ValidationError::IdentityMismatch {
            identity: identity.to_string(),
            expected_cn,
            actual_cn: csr.common_name.clone(),
        });
    }

    if !csr.dns_names.is_empty() {
        return Err(ValidationError::ForbiddenSanType { kind: SanKind::Dns });
    }
    if !csr.email_addresses.is_empty() {
        return Err(ValidationError::ForbiddenSanType { kind: SanKind::Email });
    }

    if !csr.ip_addresses.is_empty() {
        let peer = client_addr
            .and_then(parse_client_ip)
            .map(canonical_ip)
            .ok_or(ValidationError::InvalidClientAddress)?;

        for san_ip in &csr.ip_addresses {
            let actual = canonical_ip(*san_ip);
            if actual != peer {
                return Err(ValidationError::ForbiddenSanIp { expected: peer, actual });
            }
        }
    }

    debug!(identity, common_name = %csr.common_name, "Identity binding validated");
    Ok(())
}

/// Parse the host-reported client address, which may be a bare IP or a
/// socket address (`10.0.0.5:443`, `[::1]:443`).
fn parse_client_ip(addr: &str) -> Option<IpAddr> {
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return Some(ip);
    }
    addr.parse::<SocketAddr>().ok().map(|sock| sock.ip())
}

/// Collapse IPv4-mapped IPv6 addresses so `::ffff:10.0.0.5` and `10.0.0.5`
/// compare equal.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}
