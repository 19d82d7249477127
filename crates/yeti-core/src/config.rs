//! Centralized configuration for the yeti RPC client.
//!
//! Protocol constants live on associated-constant structs; per-session knobs
//! live on [`SessionConfig`], which callers build once and hand to a session.

use crate::error::{Result, RpcClientError};
use std::time::Duration;

/// Client-level defaults.
pub struct ClientConfig;

impl ClientConfig {
    pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_METHOD_PREFIX: &'static str = "yeti.";
    pub const DEFAULT_PORT: u16 = 7080;
    pub const JSONRPC_VERSION: &'static str = "2.0";
    /// Method name that asks a node to enumerate its children.
    pub const LIST_METHOD: &'static str = "_list";
    pub const WALK_MAX_DEPTH: usize = 16;
}

/// Netstring wire constants.
pub struct NetstringConfig;

impl NetstringConfig {
    pub const DELIMITER: u8 = b':';
    pub const TERMINATOR: u8 = b',';
    pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024; // 16MB
    /// Upper bound on length-prefix digits read before the delimiter.
    pub const MAX_LENGTH_DIGITS: usize = 20;
}

/// Settings applied to a single [`RpcSession`](crate::RpcSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How long the client waits for the response frame before failing
    /// with a timeout.
    pub receive_timeout: Duration,
    /// `None` leaves connect behavior to the OS.
    pub connect_timeout: Option<Duration>,
    /// Namespace prepended to every method name.
    pub method_prefix: String,
    /// Largest response payload accepted, in bytes.
    pub max_frame_size: usize,
    /// Id used for the first call on a session.
    pub initial_id: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_timeout: ClientConfig::DEFAULT_RECEIVE_TIMEOUT,
            connect_timeout: None,
            method_prefix: ClientConfig::DEFAULT_METHOD_PREFIX.to_string(),
            max_frame_size: NetstringConfig::MAX_FRAME_SIZE,
            initial_id: 0,
        }
    }
}

impl SessionConfig {
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Set the receive timeout from fractional seconds (e.g. `0.1`).
    pub fn with_receive_timeout_secs(self, secs: f64) -> Result<Self> {
        let timeout = duration_from_secs_f64(secs)?;
        Ok(self.with_receive_timeout(timeout))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_method_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.method_prefix = prefix.into();
        self
    }

    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn with_initial_id(mut self, id: u64) -> Self {
        self.initial_id = id;
        self
    }
}

/// Convert fractional seconds into a `Duration`.
///
/// Rejects negative, NaN and infinite values instead of panicking the way
/// `Duration::from_secs_f64` would.
pub fn duration_from_secs_f64(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| RpcClientError::Configuration {
        message: format!("invalid timeout {secs}: {e}"),
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.receive_timeout, Duration::from_secs(5));
        assert_eq!(config.method_prefix, "yeti.");
        assert_eq!(config.initial_id, 0);
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn test_fractional_timeout_keeps_sub_second_precision() {
        let config = SessionConfig::default()
            .with_receive_timeout_secs(1.25)
            .unwrap();
        assert_eq!(config.receive_timeout.as_secs(), 1);
        assert_eq!(config.receive_timeout.subsec_micros(), 250_000);
    }

    #[test]
    fn test_invalid_timeouts_are_configuration_errors() {
        for secs in [-1.0, f64::NAN, f64::INFINITY] {
            let err = SessionConfig::default()
                .with_receive_timeout_secs(secs)
                .unwrap_err();
            assert!(matches!(err, RpcClientError::Configuration { .. }));
        }
    }
}
