mod address_resolver;
mod exchange_observer;
mod upstream_selector;
mod upstream_transport;

pub use address_resolver::AddressResolver;
pub use exchange_observer::{ExchangeEvent, ExchangeObserver};
pub use upstream_selector::UpstreamSelector;
pub use upstream_transport::UpstreamTransport;

// Re-export for convenience
pub use ferrous_relay_domain::{DnsQuery, UpstreamTarget};
