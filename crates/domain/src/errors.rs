use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid DNS query: {0}")]
    InvalidQuery(String),

    #[error("DNS query has no question")]
    EmptyQuestion,

    #[error("No routing rule matches {0}")]
    NoMatchingRule(String),

    #[error("No upstream selected for rule {pattern}")]
    NoUpstreamSelected { pattern: String },

    #[error("Invalid upstream address: {0}")]
    InvalidAddress(String),

    #[error("Failed to resolve upstream {host}: {reason}")]
    AddressResolution { host: String, reason: String },

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Network error talking to {server}: {reason}")]
    NetworkError { server: String, reason: String },

    #[error("Response id mismatch: expected {expected}, received {received}")]
    ResponseIdMismatch { expected: u16, received: u16 },

    #[error("Malformed DNS response: {0}")]
    MalformedResponse(String),

    #[error("Failed to write response to {client}: {reason}")]
    WriteError { client: String, reason: String },
}

impl DomainError {
    /// Upstream unreachable, refused, reset or timed out.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            DomainError::AddressResolution { .. }
                | DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::TransportConnectionReset { .. }
                | DomainError::NetworkError { .. }
        )
    }

    /// Upstream answered, but the answer cannot be attributed to the query.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            DomainError::ResponseIdMismatch { .. } | DomainError::MalformedResponse(_)
        )
    }

    pub fn is_write_error(&self) -> bool {
        matches!(self, DomainError::WriteError { .. })
    }

    /// Maps an I/O failure on an upstream socket onto the network taxonomy.
    pub fn from_io(server: impl Into<String>, error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let server = server.into();
        match error.kind() {
            ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused { server },
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => {
                DomainError::TransportConnectionReset { server }
            }
            ErrorKind::TimedOut => DomainError::TransportTimeout { server },
            _ => DomainError::NetworkError {
                server,
                reason: error.to_string(),
            },
        }
    }
}
