#![allow(dead_code)]
use ferrous_relay_domain::{DomainRouter, RoutingRule, RoutingTable, UpstreamProtocol};

/// Builds routing tables from `(pattern, [addresses])` pairs.
pub struct RoutingTableBuilder {
    rules: Vec<RoutingRule>,
}

impl RoutingTableBuilder {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule(mut self, pattern: &str, addresses: &[&str]) -> Self {
        self.rules.push(
            RoutingRule::new(
                pattern,
                addresses.iter().map(|a| a.parse().unwrap()).collect(),
                UpstreamProtocol::Auto,
            )
            .unwrap(),
        );
        self
    }

    pub fn build(self) -> RoutingTable {
        RoutingTable::new(self.rules).unwrap()
    }

    pub fn router(self) -> DomainRouter {
        DomainRouter::new(self.build())
    }
}
