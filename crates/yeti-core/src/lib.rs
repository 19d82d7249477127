//! Yeti Core - netstring-framed JSON-RPC 2.0 client.
//!
//! Each call opens one TCP connection, sends one netstring-wrapped request,
//! reads one netstring-wrapped response, and checks that the response id
//! matches before classifying it as a result or a remote error.
//!
//! # Example
//!
//! ```rust,no_run
//! use yeti_core::{RpcSession, SessionConfig};
//!
//! fn main() -> yeti_core::Result<()> {
//!     let config = SessionConfig::default().with_receive_timeout_secs(2.5)?;
//!     let session = RpcSession::open("127.0.0.1", 7080, config)?;
//!
//!     let response = session.call("ping", vec![])?;
//!     println!("{}", response.result);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod netstring;
pub mod protocol;
pub mod session;
pub mod walk;

pub use config::{ClientConfig, NetstringConfig, SessionConfig};
pub use error::{ErrorKind, FramingError, Result, RpcClientError};
pub use protocol::{RequestId, RpcErrorObject, RpcRequest, RpcResponse, RpcSuccess};
pub use session::{call, RpcSession};
pub use walk::{MethodNode, TreeWalker};
