pub mod errors;
pub mod logging;
pub mod root;
pub mod routing;
pub mod server;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use routing::RouteConfig;
pub use server::ServerConfig;
