use super::rule::RoutingRule;
use crate::config::{ConfigError, RouteConfig};
use std::collections::HashSet;

/// Ordered, validated set of routing rules. Built once at startup.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
}

impl RoutingTable {
    pub fn new(rules: Vec<RoutingRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::Validation(
                "no routing rules configured".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.pattern()) {
                return Err(ConfigError::Validation(format!(
                    "pattern '{}' is configured more than once",
                    rule.pattern()
                )));
            }
        }

        Ok(Self { rules })
    }

    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, ConfigError> {
        let rules = routes
            .iter()
            .map(RoutingRule::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_catch_all(&self) -> bool {
        self.rules.iter().any(RoutingRule::is_catch_all)
    }
}
