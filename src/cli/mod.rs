//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments into a validated [`Command`]
//! - Install the logging subscriber for the duration of the run
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. Usage errors exit with status 2 before
//! any configuration is read.
//!
//! [`Command`]: crate::core::command::Command

pub mod args;
pub mod commands;

pub use args::{Cli, SubCommand};

use anyhow::Result;
use clap::error::ErrorKind;
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use crate::engine;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        verbose: cli.command.common().verbose,
    };

    let command = match cli.command.into_command() {
        Ok(command) => command,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    tracing::subscriber::with_default(subscriber(&ctx), || {
        commands::dispatch(command, &ctx).inspect_err(|e| tracing::error!("{e:#}"))
    })
}

/// Build the stderr logging subscriber for a run.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn subscriber(ctx: &engine::Context) -> impl tracing::Subscriber + Send + Sync {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if ctx.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}
