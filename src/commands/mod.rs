//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `lifecycle.rs` — create/destroy/lock/release and start/stop/kill.
//! - `status.rs` — status listings and remote-database discovery.
//! - `props.rs` — set/get/inherit property plumbing.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

use std::process::ExitCode;

use crate::cli;

pub mod lifecycle;
pub mod props;
pub mod status;

/// `help [cmd]`; needs no daemon.
pub fn help(command: Option<&str>) -> ExitCode {
    match command {
        None => cli::print_top_usage(),
        Some(name) => {
            if !cli::print_usage(name) {
                println!("help: unknown command: {name}");
            }
        }
    }
    ExitCode::SUCCESS
}

/// `version`; needs no daemon.
pub fn version() -> ExitCode {
    println!(
        "MonetDB Database Server Toolkit v{}",
        env!("CARGO_PKG_VERSION")
    );
    ExitCode::SUCCESS
}
