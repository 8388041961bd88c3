//! # Host Capabilities
//!
//! Narrow interfaces over the proxy host, one per lifecycle role. The filter
//! never talks to the host except through these traits, so the embedding
//! shim (and the test harness) only implements what the filter actually
//! uses.

/// Capabilities consumed while processing request headers.
pub trait HeaderOps {
    /// Read a named request header, if present.
    fn request_header(&self, name: &str) -> Option<String>;

    /// Send a synthetic response, terminating normal forwarding for this
    /// exchange.
    fn send_response(&mut self, status: u16, headers: &[(&str, &str)], body: &[u8]);
}

/// Capabilities consumed while processing the request body.
pub trait BodyOps {
    /// Read `len` bytes of the buffered request body starting at `start`.
    ///
    /// `None` when the host cannot produce the buffered body.
    fn request_body(&self, start: usize, len: usize) -> Option<Vec<u8>>;
}

/// Capabilities consumed while processing response headers.
pub trait ResponseOps {
    /// Append a header to the upstream response.
    fn add_response_header(&mut self, name: &str, value: &str);
}

/// Capabilities tied to the client connection.
pub trait ConnectionOps {
    /// The client's transport source address as reported by the host,
    /// typically `ip:port`.
    fn source_address(&self) -> Option<String>;
}

/// Everything the filter needs from the host for one exchange.
pub trait HostExchange: HeaderOps + BodyOps + ResponseOps + ConnectionOps {}

impl<T: HeaderOps + BodyOps + ResponseOps + ConnectionOps> HostExchange for T {}
