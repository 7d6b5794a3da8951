use async_trait::async_trait;
use ferrous_relay_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Turn a configured upstream into a socket address for one attempt.
    async fn resolve(&self, upstream: &UpstreamAddr) -> Result<SocketAddr, DomainError>;
}
