//! Error types for the yeti RPC client.
//!
//! Every failure a call can hit maps to exactly one [`RpcClientError`]
//! variant so callers can tell a timeout from a remote protocol error
//! without string matching. Nothing here is retried; errors propagate to
//! the caller as-is.

use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Malformed netstring input.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("invalid netstring length prefix {prefix:?}")]
    InvalidLength { prefix: String },

    #[error("netstring length {length} exceeds maximum {max}")]
    TooLarge { length: usize, max: usize },

    #[error("truncated netstring: expected {expected} bytes, got {received}")]
    Truncated { expected: usize, received: usize },

    #[error("missing netstring terminator: expected ',', found {found:?}")]
    MissingTerminator { found: char },

    #[error("connection closed before a frame was received")]
    ConnectionClosed,

    #[error("IO error while reading frame: {0}")]
    Io(#[source] std::io::Error),
}

impl FramingError {
    /// True when the underlying read gave up because the socket's receive
    /// timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            FramingError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

/// Main error type for RPC calls.
#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("cannot connect to {addr}: {message}")]
    Connection {
        addr: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("cannot configure socket: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("failed to send request: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("response id {actual} does not match request id {expected}")]
    Correlation { expected: Value, actual: Value },

    #[error("json_rpc error: {error}")]
    Rpc { error: Value },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, RpcClientError>;

/// Stable, programmatic name for each error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Configuration,
    Transport,
    Timeout,
    Framing,
    MalformedResponse,
    Correlation,
    Rpc,
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Framing => "FramingError",
            ErrorKind::MalformedResponse => "MalformedResponseError",
            ErrorKind::Correlation => "CorrelationError",
            ErrorKind::Rpc => "RpcError",
            ErrorKind::InvalidRequest => "InvalidRequestError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RpcClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcClientError::Connection { .. } => ErrorKind::Connection,
            RpcClientError::Configuration { .. } => ErrorKind::Configuration,
            RpcClientError::Transport { .. } => ErrorKind::Transport,
            RpcClientError::Timeout(_) => ErrorKind::Timeout,
            RpcClientError::Framing(_) => ErrorKind::Framing,
            RpcClientError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            RpcClientError::Correlation { .. } => ErrorKind::Correlation,
            RpcClientError::Rpc { .. } => ErrorKind::Rpc,
            RpcClientError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    /// Build a connection error with the address that was attempted.
    pub fn connection(addr: impl Into<String>, err: std::io::Error) -> Self {
        RpcClientError::Connection {
            addr: addr.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn configuration(err: std::io::Error) -> Self {
        RpcClientError::Configuration {
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn transport(err: std::io::Error) -> Self {
        RpcClientError::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Remote error payload, if this is an `Rpc` error.
    pub fn rpc_error(&self) -> Option<&Value> {
        match self {
            RpcClientError::Rpc { error } => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcClientError {
    fn from(err: serde_json::Error) -> Self {
        RpcClientError::MalformedResponse {
            message: err.to_string(),
        }
    }
}
