pub mod dns;

pub use dns::{ExchangeEngine, ExchangeResult, HandleDnsQueryUseCase};
