use ferrous_relay_domain::UpstreamAddr;

/// Picks the upstream of a pool that serves one request.
///
/// Implementations are called concurrently from every request task.
pub trait UpstreamSelector: Send + Sync {
    fn select<'a>(&self, pool: &'a [UpstreamAddr]) -> Option<&'a UpstreamAddr>;
}
