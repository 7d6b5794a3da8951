use crate::UpstreamProtocol;
use serde::{Deserialize, Serialize};

/// A routing rule as written in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    pub pattern: String,

    pub addresses: Vec<String>,

    #[serde(default)]
    pub protocol: UpstreamProtocol,
}
