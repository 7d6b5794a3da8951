#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_relay_application::ports::{
    AddressResolver, ExchangeEvent, ExchangeObserver, UpstreamSelector, UpstreamTransport,
};
use ferrous_relay_domain::{
    DnsQuery, DomainError, Question, UpstreamAddr, UpstreamTarget, DEFAULT_DNS_PORT,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Wire-format query header followed by an opaque payload.
pub fn make_query(id: u16, name: &str) -> DnsQuery {
    let mut raw = vec![0u8; 12];
    raw[0..2].copy_from_slice(&id.to_be_bytes());
    raw[2] = 0x01;
    raw[5] = 1;
    raw.extend_from_slice(name.as_bytes());
    DnsQuery::new(id, Question::new(name, "A", "IN"), raw)
}

/// Minimal response header with the given id and flags.
pub fn make_response(id: u16, truncated: bool, rcode: u8) -> Bytes {
    let mut raw = vec![0u8; 12];
    raw[0..2].copy_from_slice(&id.to_be_bytes());
    raw[2] = 0x81 | if truncated { 0x02 } else { 0x00 };
    raw[3] = 0x80 | (rcode & 0x0F);
    Bytes::from(raw)
}

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Reply(Bytes),
    Fail(DomainError),
    /// Never answers; the engine deadline must fire.
    Hang,
}

#[derive(Clone, Default)]
pub struct MockUpstreamTransport {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    calls: Arc<Mutex<Vec<(UpstreamTarget, Vec<u8>)>>>,
}

impl MockUpstreamTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: ScriptedReply) -> &Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_reply(&self, raw: Bytes) -> &Self {
        self.push(ScriptedReply::Reply(raw))
    }

    pub fn push_error(&self, error: DomainError) -> &Self {
        self.push(ScriptedReply::Fail(error))
    }

    pub fn calls(&self) -> Vec<(UpstreamTarget, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<UpstreamTarget> {
        self.calls().into_iter().map(|(target, _)| target).collect()
    }
}

#[async_trait]
impl UpstreamTransport for MockUpstreamTransport {
    async fn exchange(
        &self,
        target: &UpstreamTarget,
        message: &[u8],
        _timeout: Duration,
    ) -> Result<Bytes, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((*target, message.to_vec()));

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(ScriptedReply::Reply(raw)) => Ok(raw),
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DomainError::TransportTimeout {
                    server: target.addr.to_string(),
                })
            }
            None => Err(DomainError::NetworkError {
                server: target.addr.to_string(),
                reason: "no scripted reply".to_string(),
            }),
        }
    }
}

/// Resolves literal addresses as-is and hostnames from a fixed table.
#[derive(Clone, Default)]
pub struct StaticAddressResolver {
    hosts: Arc<Mutex<HashMap<String, SocketAddr>>>,
}

impl StaticAddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(self, host: &str, addr: &str) -> Self {
        self.hosts
            .lock()
            .unwrap()
            .insert(host.to_string(), addr.parse().unwrap());
        self
    }
}

#[async_trait]
impl AddressResolver for StaticAddressResolver {
    async fn resolve(&self, upstream: &UpstreamAddr) -> Result<SocketAddr, DomainError> {
        match upstream {
            UpstreamAddr::Resolved(addr) => Ok(*addr),
            UpstreamAddr::Unresolved { hostname, port } => self
                .hosts
                .lock()
                .unwrap()
                .get(hostname.as_ref())
                .map(|addr| SocketAddr::new(addr.ip(), *port))
                .ok_or_else(|| DomainError::AddressResolution {
                    host: format!("{}:{}", hostname, port),
                    reason: "unknown host".to_string(),
                }),
        }
    }
}

/// Always picks the pool member at `index`.
pub struct FixedSelector {
    pub index: usize,
}

impl FixedSelector {
    pub fn first() -> Self {
        Self { index: 0 }
    }
}

impl UpstreamSelector for FixedSelector {
    fn select<'a>(&self, pool: &'a [UpstreamAddr]) -> Option<&'a UpstreamAddr> {
        pool.get(self.index)
    }
}

/// Records the name of every event it sees, plus error details.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<&'static str>>>,
    errors: Arc<Mutex<Vec<DomainError>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<DomainError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| **e == name).count()
    }
}

impl ExchangeObserver for RecordingObserver {
    fn on_event(&self, event: &ExchangeEvent<'_>) {
        self.events.lock().unwrap().push(event.name());
        match event {
            ExchangeEvent::NetworkError { error, .. }
            | ExchangeEvent::ProtocolError { error, .. }
            | ExchangeEvent::WriteFailed { error, .. } => {
                self.errors.lock().unwrap().push((*error).clone())
            }
            ExchangeEvent::Dropped { reason, .. } => {
                self.errors.lock().unwrap().push((*reason).clone())
            }
            _ => {}
        }
    }
}

pub fn upstream(addr: &str) -> UpstreamAddr {
    addr.parse().unwrap()
}

pub fn default_port_addr(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), DEFAULT_DNS_PORT)
}
