use crate::ResponseStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid record data: {0}")]
    InvalidRecordData(String),

    #[error("Response code {0:?} has no 4-bit wire form of its own")]
    InvalidResponseStatus(ResponseStatus),

    #[error("Buffer too small: need at least {needed} bytes, capacity is {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Failed to connect to {server}: {reason}")]
    TransportConnect { server: String, reason: String },

    #[error("Failed to send request to {server}: {reason}")]
    TransportSend { server: String, reason: String },

    #[error("Failed to receive response from {server}: {reason}")]
    TransportReceive { server: String, reason: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Zero-length DNS frame from {server}")]
    EmptyFrame { server: String },

    #[error("Transport closed")]
    TransportClosed,

    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Query cancelled")]
    QueryCancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::TransportConnect { .. }
                | DomainError::TransportSend { .. }
                | DomainError::TransportReceive { .. }
                | DomainError::TransportConnectionReset { .. }
                | DomainError::EmptyFrame { .. }
                | DomainError::TransportClosed
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::QueryTimeout)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::QueryCancelled)
    }
}
