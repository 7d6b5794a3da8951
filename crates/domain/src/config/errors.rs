#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported config format for {0}, expected .json or .toml")]
    UnsupportedFormat(String),

    #[error("No configuration file found (tried: {0})")]
    NotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
