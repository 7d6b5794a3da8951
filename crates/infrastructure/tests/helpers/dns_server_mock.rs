use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

pub const ANSWER_IP: [u8; 4] = [93, 184, 216, 34];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Answer every query with one A record.
    Answer,
    /// Truncated empty reply over UDP, full answer over TCP.
    TruncateUdp,
    /// Answer with the query id bit-flipped.
    WrongId,
    /// Truncated empty reply over both transports.
    TruncateAlways,
}

/// Upstream stand-in serving UDP and TCP on the same loopback port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let (udp, tcp) = bind_pair().await;
        let addr = udp.local_addr().unwrap();
        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let udp_count = udp_queries.clone();
        let tcp_count = tcp_queries.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = udp.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            let reply = build_reply(&buf[..len], behavior, false);
                            let _ = udp.send_to(&reply, peer).await;
                        }
                    }
                    accepted = tcp.accept() => {
                        if let Ok((stream, _)) = accepted {
                            tokio::spawn(serve_tcp(stream, behavior, tcp_count.clone()));
                        }
                    }
                }
            }
        });

        Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn total_queries(&self) -> usize {
        self.udp_queries() + self.tcp_queries()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn bind_pair() -> (UdpSocket, TcpListener) {
    for _ in 0..16 {
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        if let Ok(tcp) = TcpListener::bind(addr).await {
            return (udp, tcp);
        }
    }
    panic!("could not bind UDP and TCP on the same port");
}

async fn serve_tcp(mut stream: TcpStream, behavior: MockBehavior, count: Arc<AtomicUsize>) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }
        count.fetch_add(1, Ordering::SeqCst);

        let reply = build_reply(&query, behavior, true);
        let mut frame = (reply.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(&reply);
        if stream.write_all(&frame).await.is_err() {
            return;
        }
    }
}

/// The exact bytes the mock sends back for `query`.
pub fn build_reply(query: &[u8], behavior: MockBehavior, over_tcp: bool) -> Vec<u8> {
    let truncate = match behavior {
        MockBehavior::TruncateAlways => true,
        MockBehavior::TruncateUdp => !over_tcp,
        MockBehavior::Answer | MockBehavior::WrongId => false,
    };

    let mut id = [query[0], query[1]];
    if behavior == MockBehavior::WrongId {
        id = [!id[0], !id[1]];
    }

    let mut reply = Vec::with_capacity(512);
    reply.extend_from_slice(&id);
    reply.push(0x81 | if truncate { 0x02 } else { 0x00 });
    reply.push(0x80);
    reply.extend_from_slice(&query[4..6]);
    let ancount: u16 = if truncate { 0 } else { 1 };
    reply.extend_from_slice(&ancount.to_be_bytes());
    reply.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    reply.extend_from_slice(&query[12..]);

    if !truncate {
        reply.extend_from_slice(&[
            0xc0, 0x0c, // name pointer
            0x00, 0x01, // A
            0x00, 0x01, // IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
            0x00, 0x04,
        ]);
        reply.extend_from_slice(&ANSWER_IP);
    }

    reply
}
