//! Ferrous Relay Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_response;
pub mod errors;
pub mod routing;

pub use config::{CliOverrides, Config, ConfigError, LogFormat, RouteConfig};
pub use dns_protocol::{
    Transport, UpstreamAddr, UpstreamProtocol, UpstreamTarget, DEFAULT_DNS_PORT,
};
pub use dns_query::{DnsQuery, Question};
pub use dns_response::{DnsResponse, DNS_HEADER_LEN};
pub use errors::DomainError;
pub use routing::{DomainRouter, RoutingRule, RoutingTable};
