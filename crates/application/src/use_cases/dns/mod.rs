pub mod exchange;
pub mod handle_dns_query;

pub use exchange::{ExchangeEngine, ExchangeResult};
pub use handle_dns_query::HandleDnsQueryUseCase;
