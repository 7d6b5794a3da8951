use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// Upstream server address as configured. Hostnames stay unresolved until an
/// exchange attempt needs a socket address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

fn parse_port(addr_str: &str, port_str: &str) -> Result<u16, DomainError> {
    port_str
        .parse::<u16>()
        .map_err(|e| DomainError::InvalidAddress(format!("invalid port in '{}': {}", addr_str, e)))
}

/// Accepts `IP`, `IP:PORT`, `[IPv6]`, `[IPv6]:PORT`, `HOST` and `HOST:PORT`.
/// Port 53 is assumed when none is given.
impl FromStr for UpstreamAddr {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidAddress("empty address".into()));
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(UpstreamAddr::Resolved(addr));
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let end = rest
                .find(']')
                .ok_or_else(|| DomainError::InvalidAddress(format!("unclosed '[' in '{}'", s)))?;
            let ip: IpAddr = rest[..end]
                .parse()
                .map_err(|e| DomainError::InvalidAddress(format!("'{}': {}", s, e)))?;
            let port = match &rest[end + 1..] {
                "" => DEFAULT_DNS_PORT,
                tail => {
                    let port_str = tail.strip_prefix(':').ok_or_else(|| {
                        DomainError::InvalidAddress(format!("unexpected '{}' in '{}'", tail, s))
                    })?;
                    parse_port(s, port_str)?
                }
            };
            return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, port)));
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port_str)) => (host, parse_port(s, port_str)?),
            None => (s, DEFAULT_DNS_PORT),
        };

        if host.is_empty() || host.contains(':') || host.contains(char::is_whitespace) {
            return Err(DomainError::InvalidAddress(format!("invalid host in '{}'", s)));
        }

        Ok(UpstreamAddr::Unresolved {
            hostname: host.into(),
            port,
        })
    }
}

/// Transport preference of a routing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProtocol {
    /// Mirror the transport the client used to reach the proxy.
    #[default]
    Auto,
    Udp,
    Tcp,
}

impl UpstreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }

    /// Transport of the first exchange attempt for a query received over `client`.
    pub fn initial_transport(&self, client: Transport) -> Transport {
        match self {
            Self::Auto => client,
            Self::Udp => Transport::Udp,
            Self::Tcp => Transport::Tcp,
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete transport of one exchange attempt, or of a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_name())
    }
}

/// Resolved address and transport for a single exchange attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub addr: SocketAddr,
    pub transport: Transport,
}

impl UpstreamTarget {
    pub fn new(addr: SocketAddr, transport: Transport) -> Self {
        Self { addr, transport }
    }

    /// Same upstream, reached over TCP.
    pub fn over_tcp(&self) -> Self {
        Self {
            addr: self.addr,
            transport: Transport::Tcp,
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.transport)
    }
}
