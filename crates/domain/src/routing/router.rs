use super::rule::{fqdn, RoutingRule, CATCH_ALL};
use super::table::RoutingTable;
use std::collections::HashMap;
use std::sync::Arc;

/// Longest-suffix dispatch over an immutable [`RoutingTable`].
///
/// Lookups walk the query name from its full form towards the root, one label
/// at a time, so the first pattern hit is the most specific one. The router is
/// read-only after construction and shared between request tasks without locks.
#[derive(Debug)]
pub struct DomainRouter {
    table: RoutingTable,
    index: HashMap<Arc<str>, usize>,
}

impl DomainRouter {
    pub fn new(table: RoutingTable) -> Self {
        let index = table
            .rules()
            .iter()
            .enumerate()
            .map(|(i, rule)| (Arc::from(rule.pattern()), i))
            .collect();

        Self { table, index }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Returns the most specific rule for `name`, or `None` when no pattern
    /// covers it and the table has no catch-all.
    pub fn dispatch(&self, name: &str) -> Option<&RoutingRule> {
        let name = fqdn(name);
        let mut candidate = name.as_str();

        loop {
            if let Some(&i) = self.index.get(candidate) {
                return self.table.rules().get(i);
            }
            if candidate == CATCH_ALL {
                return None;
            }
            candidate = match next_label(candidate) {
                Some(pos) if pos < candidate.len() => &candidate[pos..],
                _ => CATCH_ALL,
            };
        }
    }
}

/// Offset just past the first label separator of a presentation-form name.
/// Escaped dots (`\.`) belong to the label and are skipped.
fn next_label(name: &str) -> Option<usize> {
    let mut bytes = name.bytes().enumerate();
    while let Some((i, b)) = bytes.next() {
        match b {
            b'\\' => {
                bytes.next();
            }
            b'.' => return Some(i + 1),
            _ => {}
        }
    }
    None
}
