use crate::ports::{ExchangeEvent, ExchangeObserver, UpstreamTransport};
use ferrous_relay_domain::{DnsQuery, DnsResponse, DomainError, Transport, UpstreamTarget};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Validated outcome of an upstream exchange.
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    pub response: DnsResponse,
    /// Round-trip time of the attempt that produced `response`.
    pub rtt: Duration,
    /// Target of the final attempt; its transport is TCP after a truncation retry.
    pub target: UpstreamTarget,
    pub attempts: u8,
}

impl ExchangeResult {
    pub fn transport(&self) -> Transport {
        self.target.transport
    }

    pub fn size(&self) -> usize {
        self.response.size()
    }
}

/// Performs the upstream exchange for one query.
///
/// The first attempt uses the target's transport. A truncated UDP reply is
/// retried exactly once over TCP against the same upstream; the TCP reply is
/// final whatever its TC bit says. Every attempt is bounded by `timeout`.
pub struct ExchangeEngine {
    transport: Arc<dyn UpstreamTransport>,
    observer: Arc<dyn ExchangeObserver>,
    timeout: Duration,
}

impl ExchangeEngine {
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        observer: Arc<dyn ExchangeObserver>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            observer,
            timeout,
        }
    }

    pub async fn exchange(
        &self,
        query: &DnsQuery,
        target: UpstreamTarget,
    ) -> Result<ExchangeResult, DomainError> {
        let first = self.attempt(query, target).await?;

        if !first.response.truncated || target.transport != Transport::Udp {
            return Ok(first);
        }

        let retry_target = target.over_tcp();
        debug!(
            query_id = query.id,
            upstream = %target.addr,
            "Response truncated (TC bit), retrying via TCP"
        );
        self.observer.on_event(&ExchangeEvent::TruncatedRetry {
            query,
            target: retry_target,
        });

        let mut retried = self.attempt(query, retry_target).await?;
        retried.attempts = 2;
        Ok(retried)
    }

    async fn attempt(
        &self,
        query: &DnsQuery,
        target: UpstreamTarget,
    ) -> Result<ExchangeResult, DomainError> {
        let start = Instant::now();

        let sent = tokio::time::timeout(
            self.timeout,
            self.transport.exchange(&target, &query.raw, self.timeout),
        )
        .await
        .unwrap_or_else(|_| {
            Err(DomainError::TransportTimeout {
                server: target.addr.to_string(),
            })
        });

        let raw = match sent {
            Ok(raw) => raw,
            Err(e) => {
                self.report_failure(query, target, &e);
                return Err(e);
            }
        };
        let rtt = start.elapsed();

        let response = match validate(query, raw) {
            Ok(response) => response,
            Err(e) => {
                self.report_failure(query, target, &e);
                return Err(e);
            }
        };

        self.observer.on_event(&ExchangeEvent::AttemptSucceeded {
            query,
            target,
            rtt,
            size: response.size(),
            truncated: response.truncated,
            rcode: response.rcode_name(),
        });

        Ok(ExchangeResult {
            response,
            rtt,
            target,
            attempts: 1,
        })
    }

    fn report_failure(&self, query: &DnsQuery, target: UpstreamTarget, error: &DomainError) {
        if error.is_protocol_error() {
            self.observer.on_event(&ExchangeEvent::ProtocolError {
                query,
                target,
                error,
            });
        } else {
            self.observer.on_event(&ExchangeEvent::NetworkError {
                query,
                upstream: target.addr.to_string(),
                transport: target.transport,
                error,
            });
        }
    }
}

/// A reply is attributable to `query` only when it parses as a response and
/// carries the same message id.
fn validate(query: &DnsQuery, raw: bytes::Bytes) -> Result<DnsResponse, DomainError> {
    let response = DnsResponse::from_wire(raw)?;
    if response.id != query.id {
        return Err(DomainError::ResponseIdMismatch {
            expected: query.id,
            received: response.id,
        });
    }
    Ok(response)
}
