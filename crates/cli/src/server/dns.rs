use anyhow::Context;
use ferrous_relay_infrastructure::dns::listener::{serve_tcp, serve_udp};
use ferrous_relay_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinSet;
use tracing::info;

/// Binds UDP and TCP on the same address and serves until either listener
/// fails.
pub async fn start_dns_server(
    listen: &str,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
) -> anyhow::Result<()> {
    let socket_addr = resolve_listen_addr(listen).await?;
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let udp_socket = Arc::new(create_udp_socket(domain, socket_addr)?);
    let tcp_listener = create_tcp_listener(domain, socket_addr)?;

    info!(listen = %listen, bind_address = %socket_addr, "DNS server listening on UDP and TCP");

    let mut join_set = JoinSet::new();
    let udp_handler = handler.clone();
    join_set.spawn(async move { serve_udp(udp_socket, udp_handler).await.context("UDP listener") });
    join_set.spawn(async move {
        serve_tcp(tcp_listener, handler, idle_timeout)
            .await
            .context("TCP listener")
    });

    match join_set.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(e)) => Err(e).context("listener task panicked"),
        None => Ok(()),
    }
}

/// Resolves hostnames such as `localhost:8053`; the first address wins.
async fn resolve_listen_addr(listen: &str) -> anyhow::Result<SocketAddr> {
    if let Ok(addr) = listen.parse() {
        return Ok(addr);
    }
    tokio::net::lookup_host(listen)
        .await
        .with_context(|| format!("cannot resolve listen address {}", listen))?
        .next()
        .with_context(|| format!("listen address {} has no addresses", listen))
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}

/// Resolves on SIGINT or SIGTERM with the signal's name.
pub async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return "SIGINT";
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}
