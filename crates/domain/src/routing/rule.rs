use crate::config::{ConfigError, RouteConfig};
use crate::{UpstreamAddr, UpstreamProtocol};
use std::sync::Arc;

pub const CATCH_ALL: &str = ".";

/// Lowercases a name and gives it the trailing dot of a fully-qualified name.
pub(crate) fn fqdn(name: &str) -> String {
    let mut normalized = name.trim().to_ascii_lowercase();
    if !ends_with_separator(&normalized) {
        normalized.push('.');
    }
    normalized
}

/// A trailing `\.` is an escaped dot inside the last label, not the root.
fn ends_with_separator(name: &str) -> bool {
    let Some(rest) = name.strip_suffix('.') else {
        return false;
    };
    let escapes = rest.bytes().rev().take_while(|&b| b == b'\\').count();
    escapes % 2 == 0
}

/// One routing entry: a domain suffix and the upstream pool serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pattern: Arc<str>,
    addresses: Arc<[UpstreamAddr]>,
    protocol: UpstreamProtocol,
}

impl RoutingRule {
    pub fn new(
        pattern: &str,
        addresses: Vec<UpstreamAddr>,
        protocol: UpstreamProtocol,
    ) -> Result<Self, ConfigError> {
        if pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "routing rule has an empty pattern".to_string(),
            ));
        }

        let pattern = fqdn(pattern);
        if addresses.is_empty() {
            return Err(ConfigError::Validation(format!(
                "routing rule '{}' has no upstream addresses",
                pattern
            )));
        }

        Ok(Self {
            pattern: pattern.into(),
            addresses: addresses.into(),
            protocol,
        })
    }

    pub fn from_config(route: &RouteConfig) -> Result<Self, ConfigError> {
        let addresses = route
            .addresses
            .iter()
            .map(|a| {
                a.parse::<UpstreamAddr>().map_err(|e| {
                    ConfigError::Validation(format!("rule '{}': {}", route.pattern, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(&route.pattern, addresses, route.protocol)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn addresses(&self) -> &[UpstreamAddr] {
        &self.addresses
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        self.protocol
    }

    pub fn is_catch_all(&self) -> bool {
        &*self.pattern == CATCH_ALL
    }
}
