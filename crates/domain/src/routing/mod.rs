pub mod router;
pub mod rule;
pub mod table;

pub use router::DomainRouter;
pub use rule::RoutingRule;
pub use table::RoutingTable;
