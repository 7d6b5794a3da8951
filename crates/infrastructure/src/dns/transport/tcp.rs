use super::DnsTransport;
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_relay_domain::DomainError;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// DNS over TCP (RFC 1035 §4.2.2). One connection per exchange, closed after
/// the reply is read.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        }
    }

    async fn connect(&self, timeout: Duration) -> Result<TcpStream, DomainError> {
        let server = self.server_addr.to_string();

        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| DomainError::from_io(&server, &e))?;

        stream
            .set_nodelay(true)
            .map_err(|e| DomainError::from_io(&server, &e))?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<Bytes, DomainError> {
        let server = self.server_addr.to_string();
        let mut stream = self.connect(timeout).await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| DomainError::from_io(&server, &e))?;

        debug!(
            server = %self.server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => DomainError::TransportConnectionReset {
                    server: server.clone(),
                },
                _ => DomainError::from_io(&server, &e),
            })?;

        debug!(
            server = %self.server_addr,
            response_len = response.len(),
            "TCP response received"
        );

        Ok(Bytes::from(response))
    }
}

/// Writes one message with its two-byte big-endian length prefix.
pub async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "message of {} bytes exceeds {} byte TCP limit",
                message_bytes.len(),
                MAX_TCP_MESSAGE_SIZE
            ),
        )
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream.write_all(&frame).await?;
    stream.flush().await
}

/// Reads one length-prefixed message. A connection closed before the prefix
/// surfaces as `UnexpectedEof`.
pub async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let message_len = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; message_len];
    stream.read_exact(&mut message).await?;

    Ok(message)
}
