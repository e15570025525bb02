//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the profile(s) and builds the gateway(s)
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Configuration problems surface before any network call.
//!
//! # Async Commands
//!
//! Every gateway call is network I/O, so the engine is async. Handlers are
//! synchronous wrappers that drive it on a current-thread tokio runtime.

mod list;
mod peer;

pub use list::{list_groups, list_route_tables, list_vcns};
pub use peer::{inter_tenant, intra_tenant};

use crate::core::command::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    tracing::debug!(command = command.name(), verbose = ctx.verbose, "dispatching");

    match command {
        Command::PeerWithinTenant {
            credentials,
            targets,
        } => intra_tenant(ctx, &credentials, &targets),
        Command::PeerInterTenancies {
            requestor,
            acceptor,
            targets,
        } => inter_tenant(ctx, &requestor, &acceptor, &targets),
        Command::ListVcns { credentials } => list_vcns(&credentials),
        Command::ListGroups { credentials } => list_groups(&credentials),
        Command::ListRouteTables { credentials, vcn } => {
            list_route_tables(&credentials, vcn.as_ref())
        }
    }
}

/// Build the single-threaded runtime a command runs on.
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
