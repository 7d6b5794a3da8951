use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use tracing::{debug, info, warn};

/// Writes every exchange event as a structured tracing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl ExchangeObserver for TracingObserver {
    fn on_event(&self, event: &ExchangeEvent<'_>) {
        let query = event.query();
        let query_id = query.id;
        let class = &*query.question.record_class;
        let record_type = &*query.question.record_type;
        let qname = &*query.question.name;

        match event {
            ExchangeEvent::RequestReceived {
                client, transport, ..
            } => {
                debug!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    client = %client,
                    transport = %transport,
                    "DNS query received"
                );
            }
            ExchangeEvent::UpstreamChosen {
                pattern, upstream, ..
            } => {
                debug!(
                    query_id,
                    qname,
                    rule = *pattern,
                    upstream = %upstream,
                    "Upstream chosen"
                );
            }
            ExchangeEvent::AttemptSucceeded {
                target,
                rtt,
                size,
                truncated,
                rcode,
                ..
            } => {
                info!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    upstream = %target.addr,
                    transport = %target.transport,
                    rtt_us = rtt.as_micros() as u64,
                    size = *size,
                    truncated = *truncated,
                    rcode = *rcode,
                    "Upstream exchange completed"
                );
            }
            ExchangeEvent::TruncatedRetry { target, .. } => {
                info!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    upstream = %target.addr,
                    "Response truncated (TC bit), retrying via TCP"
                );
            }
            ExchangeEvent::NetworkError {
                upstream,
                transport,
                error,
                ..
            } => {
                warn!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    upstream = %upstream,
                    transport = %transport,
                    error = %error,
                    "Upstream network error"
                );
            }
            ExchangeEvent::ProtocolError { target, error, .. } => {
                warn!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    upstream = %target.addr,
                    transport = %target.transport,
                    error = %error,
                    "Upstream protocol error"
                );
            }
            ExchangeEvent::ResponseRelayed { client, size, .. } => {
                debug!(query_id, qname, client = %client, size = *size, "Response relayed");
            }
            ExchangeEvent::FailureRelayed { client, .. } => {
                info!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    client = %client,
                    "SERVFAIL relayed"
                );
            }
            ExchangeEvent::WriteFailed { client, error, .. } => {
                warn!(
                    query_id,
                    qname,
                    client = %client,
                    error = %error,
                    "Failed to write reply to client"
                );
            }
            ExchangeEvent::Dropped { reason, .. } => {
                warn!(
                    query_id,
                    class,
                    record_type,
                    qname,
                    reason = %reason,
                    "Query dropped"
                );
            }
        }
    }
}
