use async_trait::async_trait;
use ferrous_relay_application::ports::AddressResolver;
use ferrous_relay_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, DomainError> {
    let target = format!("{}:{}", hostname, port);

    let addrs_iter = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| DomainError::AddressResolution {
            host: target.clone(),
            reason: format!("lookup timed out after {:?}", timeout),
        })?
        .map_err(|e| DomainError::AddressResolution {
            host: target.clone(),
            reason: e.to_string(),
        })?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();

    if addrs.is_empty() {
        return Err(DomainError::AddressResolution {
            host: target,
            reason: "no addresses found".to_string(),
        });
    }

    Ok(addrs)
}

/// `AddressResolver` backed by the operating system resolver. Hostname
/// upstreams are looked up again for every attempt.
#[derive(Debug, Clone)]
pub struct SystemAddressResolver {
    timeout: Duration,
}

impl SystemAddressResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl AddressResolver for SystemAddressResolver {
    async fn resolve(&self, upstream: &UpstreamAddr) -> Result<SocketAddr, DomainError> {
        let (hostname, port) = match upstream {
            UpstreamAddr::Resolved(addr) => return Ok(*addr),
            UpstreamAddr::Unresolved { hostname, port } => (hostname.as_ref(), *port),
        };

        let addrs = resolve_all(hostname, port, self.timeout).await?;
        let chosen = addrs[0];
        debug!(
            hostname,
            resolved = %chosen,
            candidates = addrs.len(),
            "Upstream hostname resolved"
        );
        Ok(chosen)
    }
}
