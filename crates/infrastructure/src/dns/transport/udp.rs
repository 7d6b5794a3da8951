//! UDP transport for upstream queries (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is, without framing. A reply with the TC bit set is
//! returned unchanged; the exchange engine decides whether to retry over TCP.

use super::DnsTransport;
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_relay_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram an upstream can send back.
const MAX_UDP_RESPONSE_SIZE: usize = 65535;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Bytes, DomainError> {
        let server = self.server_addr.to_string();

        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| DomainError::from_io(&server, &e))?;

        // A connected socket surfaces ICMP port-unreachable as ConnectionRefused
        // and ignores datagrams from any other source.
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| DomainError::from_io(&server, &e))?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send(message_bytes))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| DomainError::from_io(&server, &e))?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| DomainError::from_io(&server, &e))?;

        recv_buf.truncate(bytes_received);

        debug!(server = %self.server_addr, bytes_received, "UDP response received");

        Ok(Bytes::from(recv_buf))
    }
}
