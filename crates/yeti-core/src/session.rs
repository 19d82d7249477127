//! One-shot RPC session over a blocking TCP connection.
//!
//! A session owns exactly one socket and carries exactly one call:
//!
//! ```text
//! open -> send request frame -> read response frame -> close
//! ```
//!
//! [`RpcSession::call`] consumes the session, and the socket is shut down
//! when the session is dropped, so every exit path (success, any error,
//! timeout) releases the descriptor.

use crate::config::{ClientConfig, SessionConfig};
use crate::error::{Result, RpcClientError};
use crate::netstring;
use crate::protocol::{RequestId, RpcRequest, RpcResponse, RpcSuccess};
use serde_json::Value;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use tracing::debug;

/// A connected, configured session ready for a single call.
#[derive(Debug)]
pub struct RpcSession {
    stream: TcpStream,
    peer: SocketAddr,
    config: SessionConfig,
}

impl RpcSession {
    /// Connect to `host:port` and apply the receive timeout.
    pub fn open(host: &str, port: u16, config: SessionConfig) -> Result<Self> {
        let target = format!("{}:{}", host, port);
        let stream = match config.connect_timeout {
            Some(timeout) => connect_with_timeout(&target, (host, port), timeout)?,
            None => TcpStream::connect((host, port))
                .map_err(|e| RpcClientError::connection(&target, e))?,
        };

        let peer = stream
            .peer_addr()
            .map_err(|e| RpcClientError::connection(&target, e))?;

        // A zero duration is rejected here by the OS layer as InvalidInput.
        stream
            .set_read_timeout(Some(config.receive_timeout))
            .map_err(RpcClientError::configuration)?;

        debug!(
            "Session opened to {} (receive timeout {:?})",
            peer, config.receive_timeout
        );

        Ok(Self {
            stream,
            peer,
            config,
        })
    }

    /// Connect using a `host[:port]` address; the port defaults to
    /// [`ClientConfig::DEFAULT_PORT`].
    pub fn connect(addr: &str, config: SessionConfig) -> Result<Self> {
        let (host, port) = split_host_port(addr)?;
        Self::open(&host, port, config)
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Call `method` with the session's configured id.
    pub fn call(self, method: &str, params: Vec<Value>) -> Result<RpcSuccess> {
        let id = RequestId::Number(self.config.initial_id);
        self.call_with_id(method, params, id)
    }

    /// Call `method` with an explicit correlation id.
    pub fn call_with_id(
        mut self,
        method: &str,
        params: Vec<Value>,
        id: impl Into<RequestId>,
    ) -> Result<RpcSuccess> {
        let request = RpcRequest::new(&self.config.method_prefix, method, params, id)?;
        let payload = request.to_bytes()?;

        netstring::write_frame(&mut self.stream, &payload).map_err(RpcClientError::transport)?;
        debug!(
            "Sent {} (id {}, {} bytes) to {}",
            request.method,
            request.id,
            payload.len(),
            self.peer
        );

        let frame = netstring::decode_with_limit(&mut self.stream, self.config.max_frame_size)
            .map_err(|e| {
                if e.is_timeout() {
                    RpcClientError::Timeout(self.config.receive_timeout)
                } else {
                    RpcClientError::Framing(e)
                }
            })?;
        debug!("Received {} byte frame from {}", frame.len(), self.peer);

        let response = RpcResponse::from_slice(&frame)?;
        if !request.id.matches(&response.id) {
            return Err(RpcClientError::Correlation {
                expected: request.id.to_value(),
                actual: response.id,
            });
        }

        response.classify()
    }
}

impl Drop for RpcSession {
    fn drop(&mut self) {
        // The peer may already be gone; the descriptor is closed either way.
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!("Session to {} closed", self.peer);
    }
}

/// Open a session and make a single call.
pub fn call(
    host: &str,
    port: u16,
    method: &str,
    params: Vec<Value>,
    config: SessionConfig,
) -> Result<RpcSuccess> {
    RpcSession::open(host, port, config)?.call(method, params)
}

fn connect_with_timeout(
    target: &str,
    addr: impl ToSocketAddrs,
    timeout: std::time::Duration,
) -> Result<TcpStream> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|e| RpcClientError::connection(target, e))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    let err = last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "address resolved to nothing",
        )
    });
    Err(RpcClientError::connection(target, err))
}

/// Split `host[:port]`, accepting bracketed IPv6 literals.
pub fn split_host_port(addr: &str) -> Result<(String, u16)> {
    if let Ok(sock) = addr.parse::<SocketAddr>() {
        return Ok((sock.ip().to_string(), sock.port()));
    }

    let invalid = |message: String| RpcClientError::Connection {
        addr: addr.to_string(),
        message,
        source: None,
    };

    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') || host.starts_with('[') => {
            let port = port
                .parse::<u16>()
                .map_err(|e| invalid(format!("invalid port {:?}: {}", port, e)))?;
            let host = host.trim_start_matches('[').trim_end_matches(']');
            if host.is_empty() {
                return Err(invalid("empty host".to_string()));
            }
            Ok((host.to_string(), port))
        }
        _ if addr.is_empty() => Err(invalid("empty host".to_string())),
        _ => Ok((
            addr.trim_start_matches('[').trim_end_matches(']').to_string(),
            ClientConfig::DEFAULT_PORT,
        )),
    }
}
