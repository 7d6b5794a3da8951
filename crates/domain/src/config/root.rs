use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::ConfigError;
use super::logging::{LogFormat, LoggingConfig};
use super::routing::RouteConfig;
use super::server::ServerConfig;
use crate::routing::RoutingTable;

const LOCAL_CONFIG: &str = "ferrous-relay.json";
const SYSTEM_CONFIG: &str = "/etc/ferrous-relay/config.json";

/// Main configuration structure for Ferrous Relay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener and upstream exchange settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Ordered routing rules
    #[serde(default)]
    pub filters: Vec<RouteConfig>,
}

impl Config {
    /// Load, override and validate the configuration.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-relay.json in current directory
    /// 3. /etc/ferrous-relay/config.json
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG).exists() {
            Self::from_file(LOCAL_CONFIG)?
        } else if Path::new(SYSTEM_CONFIG).exists() {
            Self::from_file(SYSTEM_CONFIG)?
        } else {
            return Err(ConfigError::NotFound(format!(
                "{}, {}",
                LOCAL_CONFIG, SYSTEM_CONFIG
            )));
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file. TOML is used for `.toml`
    /// files, JSON otherwise.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") | None => Self::from_json_str(&contents),
            Some(_) => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen {
            self.server.listen = listen;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.server.query_timeout_ms = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms cannot be 0".to_string(),
            ));
        }

        if self.server.tcp_idle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tcp_idle_timeout_secs cannot be 0".to_string(),
            ));
        }

        validate_listen(&self.server.listen)?;
        self.routing_table().map(|_| ())
    }

    /// Build the immutable routing table from the configured filters.
    pub fn routing_table(&self) -> Result<RoutingTable, ConfigError> {
        RoutingTable::from_config(&self.filters)
    }
}

fn validate_listen(listen: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("invalid listen address '{}'", listen));

    if listen.parse::<std::net::SocketAddr>().is_ok() {
        return Ok(());
    }

    let (host, port) = listen.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(invalid());
    }
    Ok(())
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}
