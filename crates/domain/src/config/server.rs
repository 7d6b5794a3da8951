use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Shared by the UDP and TCP listeners.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Deadline of one upstream exchange attempt.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,
}

impl ServerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn tcp_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            query_timeout_ms: default_query_timeout_ms(),
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
        }
    }
}

fn default_listen() -> String {
    "localhost:8053".to_string()
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}
