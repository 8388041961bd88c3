//! # Stage Controller
//!
//! The per-exchange state machine. The host delivers lifecycle events one at
//! a time (request headers, body chunks, response headers, stream end) and
//! the controller sequences identity extraction, CSR decoding and the
//! binding policy against them, producing exactly one accept/reject decision
//! per exchange.
//!
//! One [`CsrBindingFilter`] instance exists per exchange; the only shared
//! state is the immutable [`FilterConfig`]. Anything that must survive a
//! pause (the cached identity, the recorded outcome) lives on the instance,
//! never in transient call state.

pub mod host;

pub use host::{BodyOps, ConnectionOps, HeaderOps, HostExchange, ResponseOps};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::errors::{Result, ValidationError, ValidationOutcome};
use crate::identity::RequestIdentity;
use crate::{body, csr, identity, policy};

/// Fixed-name header announcing the validation outcome on every response.
pub const OUTCOME_HEADER: &str = "x-certsigner-envoy-wasm";

/// What the host should do with the stream after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Keep forwarding.
    Continue,
    /// Hold the stream; resume on the next event for this exchange.
    Pause,
}

/// Lifecycle position of one exchange.
///
/// `Rejected` is terminal and reachable from any state before `Decided`;
/// the remaining states advance strictly left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    HeadersReceived,
    IdentityExtracted(RequestIdentity),
    BodyComplete,
    Decided,
    ResponseAnnotated,
    Done,
    Rejected,
}

/// Per-exchange validation filter.
pub struct CsrBindingFilter {
    config: Arc<FilterConfig>,
    state: ExchangeState,
    outcome: Option<ValidationOutcome>,
}

impl CsrBindingFilter {
    /// Create the filter instance for a new exchange.
    pub fn new(config: Arc<FilterConfig>) -> Self {
        Self { config, state: ExchangeState::Idle, outcome: None }
    }

    /// Current lifecycle state, mainly for the embedding shim and tests.
    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    /// The recorded decision, once one exists.
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        self.outcome.as_ref()
    }

    /// Request headers arrived: extract the caller identity.
    ///
    /// On success the identity is cached for the body stage and the stream
    /// continues; on failure a synthetic 401/403 is sent and the exchange is
    /// rejected.
    pub fn on_request_headers(&mut self, host: &mut dyn HostExchange) -> FilterAction {
        if self.state != ExchangeState::Idle {
            return FilterAction::Continue;
        }
        self.state = ExchangeState::HeadersReceived;

        let auth = host.request_header("authorization");
        match identity::extract_identity(auth.as_deref(), &self.config.claim) {
            Ok(request_identity) => {
                self.state = ExchangeState::IdentityExtracted(request_identity);
                FilterAction::Continue
            }
            Err(err) => self.reject(host, err),
        }
    }

    /// A request body chunk arrived.
    ///
    /// The decision needs the complete body, so non-final chunks pause the
    /// stream. On the final chunk the extract → decode → validate pipeline
    /// runs and the exchange is decided.
    pub fn on_request_body(
        &mut self,
        host: &mut dyn HostExchange,
        body_size: usize,
        end_of_stream: bool,
    ) -> FilterAction {
        match std::mem::replace(&mut self.state, ExchangeState::BodyComplete) {
            ExchangeState::IdentityExtracted(request_identity) if end_of_stream => {
                match self.decide(&*host, &request_identity, body_size) {
                    Ok(()) => {
                        debug!(
                            identity = %request_identity.identity,
                            "Certificate signing request accepted"
                        );
                        self.outcome = Some(ValidationOutcome::Success);
                        self.state = ExchangeState::Decided;
                        FilterAction::Continue
                    }
                    Err(err) => self.reject(host, err),
                }
            }
            state @ ExchangeState::IdentityExtracted(_) => {
                // Decision needs the complete body; hold the stream.
                self.state = state;
                FilterAction::Pause
            }
            state => {
                // Body event outside the body stage: host-contract violation.
                self.state = state;
                FilterAction::Continue
            }
        }
    }

    /// Response headers arrived: annotate the forwarded response with the
    /// recorded outcome.
    pub fn on_response_headers(&mut self, host: &mut dyn HostExchange) -> FilterAction {
        match self.state {
            ExchangeState::Decided => {
                let value =
                    self.outcome.as_ref().map_or("failure", ValidationOutcome::as_header_value);
                host.add_response_header(OUTCOME_HEADER, value);
                self.state = ExchangeState::ResponseAnnotated;
            }
            ExchangeState::Rejected => {
                // The synthetic response already carries the header; a local
                // reply routed back through the response path gets the same
                // annotation.
                host.add_response_header(OUTCOME_HEADER, "failure");
            }
            _ => {}
        }
        FilterAction::Continue
    }

    /// The exchange ended: release per-exchange state.
    pub fn on_stream_done(&mut self) {
        debug!("Exchange finished");
        self.outcome = None;
        self.state = ExchangeState::Done;
    }

    /// Run the body pipeline: read the buffered body, extract the CSR field,
    /// decode the PKCS#10 structure, validate the binding.
    fn decide(
        &self,
        host: &dyn HostExchange,
        request_identity: &RequestIdentity,
        body_size: usize,
    ) -> Result<()> {
        let raw_body = host.request_body(0, body_size).ok_or(ValidationError::BodyRead)?;
        let pem = body::extract_csr_pem(&raw_body, self.config.signer)?;
        let decoded = csr::decode_csr_pem(pem.as_bytes())?;
        let client_addr = host.source_address();
        policy::validate_binding(
            &request_identity.identity,
            &self.config.user_prefix,
            &decoded,
            client_addr.as_deref(),
        )
    }

    /// First failure: send the synthetic response and terminate the exchange.
    fn reject(&mut self, host: &mut dyn HostExchange, err: ValidationError) -> FilterAction {
        warn!(
            status = err.status_code(),
            error = %err,
            "Rejecting certificate signing request"
        );
        host.send_response(
            err.status_code(),
            &[(OUTCOME_HEADER, "failure")],
            err.response_body().as_bytes(),
        );
        self.outcome = Some(ValidationOutcome::Failure(err));
        self.state = ExchangeState::Rejected;
        FilterAction::Pause
    }
}
