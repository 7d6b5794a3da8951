use super::query_parser;
use super::relay::{ClientConnection, ResponseRelay};
use bytes::Bytes;
use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use ferrous_relay_application::use_cases::HandleDnsQueryUseCase;
use ferrous_relay_domain::DomainError;
use std::sync::Arc;
use tracing::debug;

/// What happened to one client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The upstream reply was written to the client.
    Relayed,
    /// A SERVFAIL was written to the client.
    Failed,
    /// Nothing was written: the message was unusable or no rule matched.
    Dropped,
    /// Writing to the client failed.
    WriteFailed,
}

/// Per-request entry point shared by the UDP and TCP listeners.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    relay: ResponseRelay,
    observer: Arc<dyn ExchangeObserver>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>, observer: Arc<dyn ExchangeObserver>) -> Self {
        Self {
            use_case,
            relay: ResponseRelay::new(observer.clone()),
            observer,
        }
    }

    pub async fn handle(&self, raw: Bytes, conn: &dyn ClientConnection) -> QueryOutcome {
        let query = match query_parser::parse_query(raw) {
            Ok(query) => query,
            Err(e) => {
                debug!(
                    client = %conn.peer_addr(),
                    transport = %conn.transport(),
                    error = %e,
                    "Dropping unusable client message"
                );
                return QueryOutcome::Dropped;
            }
        };

        self.observer.on_event(&ExchangeEvent::RequestReceived {
            query: &query,
            client: conn.peer_addr(),
            transport: conn.transport(),
        });

        let written = match self.use_case.execute(&query, conn.transport()).await {
            Ok(result) => self
                .relay
                .relay(conn, &query, &result.response)
                .await
                .map(|_| QueryOutcome::Relayed),
            Err(DomainError::NoMatchingRule(_)) => return QueryOutcome::Dropped,
            Err(_) => self
                .relay
                .relay_failure(conn, &query)
                .await
                .map(|_| QueryOutcome::Failed),
        };

        written.unwrap_or(QueryOutcome::WriteFailed)
    }
}
