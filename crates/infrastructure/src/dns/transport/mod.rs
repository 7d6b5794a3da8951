pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_relay_application::ports::UpstreamTransport;
use ferrous_relay_domain::{DomainError, Transport, UpstreamTarget};
use std::time::Duration;

pub use resolver::SystemAddressResolver;
pub use tcp::TcpTransport;
pub use udp::UdpTransport;

/// A connection-less sender bound to one upstream address.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Bytes, DomainError>;
}

/// Socket-backed `UpstreamTransport`. Every exchange opens its own socket or
/// connection, so concurrent requests never share upstream state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkTransport;

impl NetworkTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpstreamTransport for NetworkTransport {
    async fn exchange(
        &self,
        target: &UpstreamTarget,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DomainError> {
        match target.transport {
            Transport::Udp => UdpTransport::new(target.addr).send(message, timeout).await,
            Transport::Tcp => TcpTransport::new(target.addr).send(message, timeout).await,
        }
    }
}
