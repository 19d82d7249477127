//! Yeti RPC - command-line client for netstring JSON-RPC services.
//!
//! Calls one method and prints the full response envelope as pretty JSON:
//!
//! ```text
//! yeti-rpc <host> <port> <method> [args...]
//! yeti-rpc --walk <host> <port>
//! ```
//!
//! Exits non-zero on any failure, after printing the error kind and message
//! to stderr.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use yeti_core::{RpcClientError, RpcErrorObject, RpcSession, TreeWalker};

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the response.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.session_config()?;

    if args.walk {
        let tree = TreeWalker::new(&args.host, args.port, config)
            .with_max_depth(args.max_depth)
            .walk()?;
        print!("{}", tree.render());
        return Ok(());
    }

    // clap enforces this unless --walk is set.
    let method = args.method.as_deref().context("missing method name")?;
    debug!("Calling {}{} on {}:{}", args.prefix, method, args.host, args.port);

    let session = RpcSession::open(&args.host, args.port, config)?;
    let response = session.call(method, args.params())?;

    let pretty = serde_json::to_string_pretty(&response.envelope)
        .context("failed to format response")?;
    println!("{}", pretty);
    Ok(())
}

fn report(err: &anyhow::Error) {
    let Some(rpc_err) = err.downcast_ref::<RpcClientError>() else {
        eprintln!("error: {:#}", err);
        return;
    };

    eprintln!("error[{}]: {}", rpc_err.kind(), rpc_err);
    if let Some(payload) = rpc_err.rpc_error() {
        if let Some(obj) = RpcErrorObject::from_payload(payload) {
            eprintln!("  code: {}", obj.code);
            eprintln!("  message: {}", obj.message);
            if let Some(data) = obj.data {
                eprintln!("  data: {}", data);
            }
        }
    }
}
