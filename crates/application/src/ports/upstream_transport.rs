use async_trait::async_trait;
use bytes::Bytes;
use ferrous_relay_domain::{DomainError, UpstreamTarget};
use std::time::Duration;

#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send one wire-format message to `target` over its transport and return
    /// the raw reply. Each call owns its socket or connection.
    async fn exchange(
        &self,
        target: &UpstreamTarget,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DomainError>;
}
