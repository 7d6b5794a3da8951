use super::transport::tcp::send_with_length_prefix;
use super::wire_response;
use async_trait::async_trait;
use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use ferrous_relay_domain::{DnsQuery, DnsResponse, DomainError, Transport};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

/// The client side of one request: where the reply goes and how.
#[async_trait]
pub trait ClientConnection: Send + Sync {
    fn peer_addr(&self) -> SocketAddr;

    fn transport(&self) -> Transport;

    async fn write(&self, message: &[u8]) -> io::Result<()>;
}

/// Replies to a datagram's source through the shared listener socket.
pub struct UdpClientConnection {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpClientConnection {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl ClientConnection for UdpClientConnection {
    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn transport(&self) -> Transport {
        Transport::Udp
    }

    async fn write(&self, message: &[u8]) -> io::Result<()> {
        self.socket.send_to(message, self.peer).await.map(|_| ())
    }
}

pub type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// Writes length-prefixed replies on a TCP connection. Requests on the same
/// connection share the writer; the lock keeps frames from interleaving.
#[derive(Clone)]
pub struct TcpClientConnection {
    writer: SharedWriter,
    peer: SocketAddr,
}

impl TcpClientConnection {
    pub fn new<W>(writer: W, peer: SocketAddr) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            peer,
        }
    }
}

#[async_trait]
impl ClientConnection for TcpClientConnection {
    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn transport(&self) -> Transport {
        Transport::Tcp
    }

    async fn write(&self, message: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        send_with_length_prefix(&mut *writer, message).await
    }
}

/// Delivers the outcome of a request to its client.
///
/// Write failures are reported once and never retried; the client is
/// presumed gone.
pub struct ResponseRelay {
    observer: Arc<dyn ExchangeObserver>,
}

impl ResponseRelay {
    pub fn new(observer: Arc<dyn ExchangeObserver>) -> Self {
        Self { observer }
    }

    /// Writes the upstream reply bytes exactly as received.
    pub async fn relay(
        &self,
        conn: &dyn ClientConnection,
        query: &DnsQuery,
        response: &DnsResponse,
    ) -> Result<(), DomainError> {
        self.write(conn, query, &response.raw).await?;
        self.observer.on_event(&ExchangeEvent::ResponseRelayed {
            query,
            client: conn.peer_addr(),
            size: response.size(),
        });
        Ok(())
    }

    /// Writes a synthesized SERVFAIL carrying the query's id and question.
    pub async fn relay_failure(
        &self,
        conn: &dyn ClientConnection,
        query: &DnsQuery,
    ) -> Result<(), DomainError> {
        let reply = wire_response::build_servfail(query);
        self.write(conn, query, &reply).await?;
        self.observer.on_event(&ExchangeEvent::FailureRelayed {
            query,
            client: conn.peer_addr(),
        });
        Ok(())
    }

    async fn write(
        &self,
        conn: &dyn ClientConnection,
        query: &DnsQuery,
        message: &[u8],
    ) -> Result<(), DomainError> {
        let client = conn.peer_addr();
        conn.write(message).await.map_err(|e| {
            let error = DomainError::WriteError {
                client: client.to_string(),
                reason: e.to_string(),
            };
            self.observer.on_event(&ExchangeEvent::WriteFailed {
                query,
                client,
                error: &error,
            });
            error
        })
    }
}
