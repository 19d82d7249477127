//! Command-line arguments.

use clap::Parser;
use serde_json::Value;
use yeti_core::{ClientConfig, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "yeti-rpc")]
#[command(about = "Call a method on a netstring JSON-RPC service")]
pub struct Args {
    /// Host to connect to
    pub host: String,

    /// Port to connect to
    pub port: u16,

    /// Method name, without the namespace prefix
    #[arg(required_unless_present = "walk")]
    pub method: Option<String>,

    /// Positional params, sent as strings
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Seconds to wait for the response frame (fractions allowed)
    #[arg(short, long, env = "YETI_RPC_TIMEOUT", default_value_t = ClientConfig::DEFAULT_RECEIVE_TIMEOUT.as_secs_f64())]
    pub timeout: f64,

    /// Namespace prepended to the method name
    #[arg(long, env = "YETI_RPC_PREFIX", default_value = ClientConfig::DEFAULT_METHOD_PREFIX)]
    pub prefix: String,

    /// Request id
    #[arg(long, default_value = "0")]
    pub id: u64,

    /// Walk the service's method tree instead of calling a method
    #[arg(long)]
    pub walk: bool,

    /// Maximum depth when walking
    #[arg(long, default_value_t = ClientConfig::WALK_MAX_DEPTH)]
    pub max_depth: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    pub fn session_config(&self) -> yeti_core::Result<SessionConfig> {
        Ok(SessionConfig::default()
            .with_receive_timeout_secs(self.timeout)?
            .with_method_prefix(self.prefix.clone())
            .with_initial_id(self.id))
    }

    /// Positional arguments as JSON-RPC params, without type coercion.
    pub fn params(&self) -> Vec<Value> {
        self.args.iter().cloned().map(Value::String).collect()
    }
}
