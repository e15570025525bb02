//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Listing rows and peering summaries
//!
//! # Design
//!
//! Only command results are printed here. Progress and errors are
//! `tracing` events written to stderr by the subscriber the CLI installs.

pub mod output;
