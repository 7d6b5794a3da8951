pub mod events;
pub mod listener;
pub mod query_parser;
pub mod relay;
pub mod server;
pub mod transport;
pub mod wire_response;

pub use events::{CompositeObserver, ExchangeMetrics, TracingObserver};
pub use relay::{ClientConnection, ResponseRelay, TcpClientConnection, UdpClientConnection};
pub use server::{DnsServerHandler, QueryOutcome};
pub use transport::{NetworkTransport, SystemAddressResolver};
