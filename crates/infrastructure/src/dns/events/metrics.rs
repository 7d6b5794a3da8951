use dashmap::DashMap;
use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub relayed: u64,
    pub failures: u64,
    pub dropped: u64,
    pub attempts: u64,
    pub truncated_retries: u64,
    pub network_errors: u64,
    pub protocol_errors: u64,
    pub write_errors: u64,
    pub total_rtt_us: u64,
}

impl MetricsSnapshot {
    pub fn avg_rtt_ms(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.total_rtt_us as f64 / self.attempts as f64 / 1000.0
    }
}

/// Event counters for the lifetime of the process.
#[derive(Clone, Default)]
pub struct ExchangeMetrics {
    requests: Arc<AtomicU64>,
    relayed: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    attempts: Arc<AtomicU64>,
    truncated_retries: Arc<AtomicU64>,
    network_errors: Arc<AtomicU64>,
    protocol_errors: Arc<AtomicU64>,
    write_errors: Arc<AtomicU64>,
    total_rtt_us: Arc<AtomicU64>,

    upstream_counts: Arc<DashMap<String, u64>>,
}

impl ExchangeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            relayed: self.relayed.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            truncated_retries: self.truncated_retries.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            total_rtt_us: self.total_rtt_us.load(Ordering::Relaxed),
        }
    }

    /// Successful attempts per upstream socket address.
    pub fn upstream_count(&self, upstream: &str) -> u64 {
        self.upstream_counts.get(upstream).map(|v| *v).unwrap_or(0)
    }

    pub fn top_upstreams(&self, n: usize) -> Vec<(String, u64)> {
        let mut upstreams: Vec<_> = self
            .upstream_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        upstreams.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        upstreams.truncate(n);
        upstreams
    }

    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            requests = snapshot.requests,
            relayed = snapshot.relayed,
            servfail = snapshot.failures,
            dropped = snapshot.dropped,
            truncated_retries = snapshot.truncated_retries,
            network_errors = snapshot.network_errors,
            protocol_errors = snapshot.protocol_errors,
            write_errors = snapshot.write_errors,
            avg_rtt_ms = snapshot.avg_rtt_ms(),
            "Exchange summary"
        );
        for (upstream, count) in self.top_upstreams(10) {
            info!(upstream = %upstream, answers = count, "Upstream usage");
        }
    }
}

impl ExchangeObserver for ExchangeMetrics {
    fn on_event(&self, event: &ExchangeEvent<'_>) {
        let counter = match event {
            ExchangeEvent::RequestReceived { .. } => &self.requests,
            ExchangeEvent::UpstreamChosen { .. } => return,
            ExchangeEvent::AttemptSucceeded { target, rtt, .. } => {
                self.total_rtt_us
                    .fetch_add(rtt.as_micros() as u64, Ordering::Relaxed);
                self.upstream_counts
                    .entry(target.addr.to_string())
                    .and_modify(|c| *c += 1)
                    .or_insert(1);
                &self.attempts
            }
            ExchangeEvent::TruncatedRetry { .. } => &self.truncated_retries,
            ExchangeEvent::NetworkError { .. } => &self.network_errors,
            ExchangeEvent::ProtocolError { .. } => &self.protocol_errors,
            ExchangeEvent::ResponseRelayed { .. } => &self.relayed,
            ExchangeEvent::FailureRelayed { .. } => &self.failures,
            ExchangeEvent::WriteFailed { .. } => &self.write_errors,
            ExchangeEvent::Dropped { .. } => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
