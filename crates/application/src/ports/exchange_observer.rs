use ferrous_relay_domain::{DnsQuery, DomainError, Transport, UpstreamAddr, UpstreamTarget};
use std::net::SocketAddr;
use std::time::Duration;

/// Observable points of a request's life, from arrival to relay.
#[derive(Debug)]
pub enum ExchangeEvent<'a> {
    RequestReceived {
        query: &'a DnsQuery,
        client: SocketAddr,
        transport: Transport,
    },
    UpstreamChosen {
        query: &'a DnsQuery,
        pattern: &'a str,
        upstream: &'a UpstreamAddr,
    },
    AttemptSucceeded {
        query: &'a DnsQuery,
        target: UpstreamTarget,
        rtt: Duration,
        size: usize,
        truncated: bool,
        rcode: &'static str,
    },
    TruncatedRetry {
        query: &'a DnsQuery,
        target: UpstreamTarget,
    },
    NetworkError {
        query: &'a DnsQuery,
        upstream: String,
        transport: Transport,
        error: &'a DomainError,
    },
    ProtocolError {
        query: &'a DnsQuery,
        target: UpstreamTarget,
        error: &'a DomainError,
    },
    ResponseRelayed {
        query: &'a DnsQuery,
        client: SocketAddr,
        size: usize,
    },
    FailureRelayed {
        query: &'a DnsQuery,
        client: SocketAddr,
    },
    WriteFailed {
        query: &'a DnsQuery,
        client: SocketAddr,
        error: &'a DomainError,
    },
    Dropped {
        query: &'a DnsQuery,
        reason: &'a DomainError,
    },
}

impl ExchangeEvent<'_> {
    pub fn query(&self) -> &DnsQuery {
        match self {
            Self::RequestReceived { query, .. }
            | Self::UpstreamChosen { query, .. }
            | Self::AttemptSucceeded { query, .. }
            | Self::TruncatedRetry { query, .. }
            | Self::NetworkError { query, .. }
            | Self::ProtocolError { query, .. }
            | Self::ResponseRelayed { query, .. }
            | Self::FailureRelayed { query, .. }
            | Self::WriteFailed { query, .. }
            | Self::Dropped { query, .. } => query,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestReceived { .. } => "request_received",
            Self::UpstreamChosen { .. } => "upstream_chosen",
            Self::AttemptSucceeded { .. } => "attempt_succeeded",
            Self::TruncatedRetry { .. } => "truncated_retry",
            Self::NetworkError { .. } => "network_error",
            Self::ProtocolError { .. } => "protocol_error",
            Self::ResponseRelayed { .. } => "response_relayed",
            Self::FailureRelayed { .. } => "failure_relayed",
            Self::WriteFailed { .. } => "write_failed",
            Self::Dropped { .. } => "dropped",
        }
    }
}

/// Logging sink of the core, decoupled from any output format.
pub trait ExchangeObserver: Send + Sync {
    fn on_event(&self, event: &ExchangeEvent<'_>);
}

