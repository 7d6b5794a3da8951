use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use ferrous_relay_application::services::RandomUpstreamSelector;
use ferrous_relay_application::use_cases::{ExchangeEngine, HandleDnsQueryUseCase};
use ferrous_relay_domain::{DomainRouter, RoutingRule, RoutingTable, UpstreamProtocol};
use ferrous_relay_infrastructure::dns::events::CompositeObserver;
use ferrous_relay_infrastructure::dns::listener::{serve_tcp, serve_udp};
use ferrous_relay_infrastructure::dns::{
    DnsServerHandler, ExchangeMetrics, NetworkTransport, SystemAddressResolver, TracingObserver,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

pub const QUERY_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| **e == name).count()
    }
}

impl ExchangeObserver for RecordingObserver {
    fn on_event(&self, event: &ExchangeEvent<'_>) {
        self.events.lock().unwrap().push(event.name());
    }
}

/// A fully wired proxy listening on loopback UDP and TCP.
pub struct TestProxy {
    pub udp_addr: SocketAddr,
    pub tcp_addr: SocketAddr,
    pub observer: RecordingObserver,
    pub metrics: ExchangeMetrics,
    tasks: Vec<JoinHandle<()>>,
}

impl TestProxy {
    pub async fn start(rules: &[(&str, Vec<String>, UpstreamProtocol)]) -> Self {
        let rules = rules
            .iter()
            .map(|(pattern, addresses, protocol)| {
                let addresses = addresses.iter().map(|a| a.parse().unwrap()).collect();
                RoutingRule::new(pattern, addresses, *protocol).unwrap()
            })
            .collect();
        let router = Arc::new(DomainRouter::new(RoutingTable::new(rules).unwrap()));

        let observer = RecordingObserver::default();
        let metrics = ExchangeMetrics::new();
        let composite: Arc<dyn ExchangeObserver> = Arc::new(
            CompositeObserver::new()
                .with(Arc::new(TracingObserver::new()))
                .with(Arc::new(metrics.clone()))
                .with(Arc::new(observer.clone())),
        );

        let engine = Arc::new(ExchangeEngine::new(
            Arc::new(NetworkTransport::new()),
            composite.clone(),
            QUERY_TIMEOUT,
        ));
        let use_case = Arc::new(HandleDnsQueryUseCase::new(
            router,
            Arc::new(RandomUpstreamSelector::new()),
            Arc::new(SystemAddressResolver::new(QUERY_TIMEOUT)),
            engine,
            composite.clone(),
        ));
        let handler = Arc::new(DnsServerHandler::new(use_case, composite));

        let udp = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let udp_addr = udp.local_addr().unwrap();
        let tcp_addr = tcp.local_addr().unwrap();

        let udp_handler = handler.clone();
        let tasks = vec![
            tokio::spawn(async move {
                let _ = serve_udp(udp, udp_handler).await;
            }),
            tokio::spawn(async move {
                let _ = serve_tcp(tcp, handler, Duration::from_millis(500)).await;
            }),
        ];

        Self {
            udp_addr,
            tcp_addr,
            observer,
            metrics,
            tasks,
        }
    }

    /// Sends one datagram and waits for the reply, `None` on silence.
    pub async fn query_udp(&self, query: &[u8]) -> Option<Vec<u8>> {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(query, self.udp_addr).await.unwrap();

        let mut buf = vec![0u8; 65535];
        let received =
            tokio::time::timeout(QUERY_TIMEOUT * 3, client.recv_from(&mut buf)).await;
        match received {
            Ok(Ok((len, _))) => Some(buf[..len].to_vec()),
            _ => None,
        }
    }

    pub async fn connect_tcp(&self) -> TcpStream {
        TcpStream::connect(self.tcp_addr).await.unwrap()
    }

    pub async fn query_tcp(&self, query: &[u8]) -> Option<Vec<u8>> {
        let mut stream = self.connect_tcp().await;
        write_frame(&mut stream, query).await;
        tokio::time::timeout(QUERY_TIMEOUT * 3, read_frame(&mut stream))
            .await
            .ok()
            .flatten()
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

pub async fn write_frame(stream: &mut TcpStream, message: &[u8]) {
    let mut frame = (message.len() as u16).to_be_bytes().to_vec();
    frame.extend_from_slice(message);
    stream.write_all(&frame).await.unwrap();
}

pub async fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.ok()?;
    let mut message = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    stream.read_exact(&mut message).await.ok()?;
    Some(message)
}
