//! Accept loops for the client-facing UDP and TCP sockets.
//!
//! Every datagram and every TCP message is handled on its own task, so a slow
//! upstream only holds up the request waiting on it.

use super::relay::{TcpClientConnection, UdpClientConnection};
use super::server::DnsServerHandler;
use super::transport::tcp::read_with_length_prefix;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, error, warn};

const MAX_UDP_QUERY_SIZE: usize = 65535;

pub async fn serve_udp(socket: Arc<UdpSocket>, handler: Arc<DnsServerHandler>) -> io::Result<()> {
    let mut recv_buf = vec![0u8; MAX_UDP_QUERY_SIZE];

    loop {
        let (len, peer) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if is_transient(&e) => {
                debug!(error = %e, "Transient UDP receive error");
                continue;
            }
            Err(e) => {
                error!(error = %e, "UDP listener failed");
                return Err(e);
            }
        };

        let message = Bytes::copy_from_slice(&recv_buf[..len]);
        let conn = UdpClientConnection::new(socket.clone(), peer);
        let handler = handler.clone();
        tokio::spawn(async move {
            handler.handle(message, &conn).await;
        });
    }
}

pub async fn serve_tcp(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
) -> io::Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "TCP accept failed");
                continue;
            }
        };

        let handler = handler.clone();
        tokio::spawn(async move {
            serve_tcp_connection(stream, peer, handler, idle_timeout).await;
        });
    }
}

fn configure_client_stream(stream: &TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(client = %peer, error = %e, "Failed to set TCP_NODELAY");
    }
}

async fn serve_tcp_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
) {
    configure_client_stream(&stream, peer);
    let (mut reader, writer) = stream.into_split();
    let conn = TcpClientConnection::new(writer, peer);

    loop {
        let message = match tokio::time::timeout(idle_timeout, read_with_length_prefix(&mut reader))
            .await
        {
            Ok(Ok(message)) => message,
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!(client = %peer, "TCP client closed connection");
                break;
            }
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP read failed");
                break;
            }
            Err(_) => {
                debug!(client = %peer, idle = ?idle_timeout, "Closing idle TCP connection");
                break;
            }
        };

        let conn = conn.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            handler.handle(Bytes::from(message), &conn).await;
        });
    }
}

/// Errors a UDP socket reports for a previous send (ICMP feedback) rather
/// than for the socket itself.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
