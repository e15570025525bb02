//! peer-oracle-vcn - Peer Oracle Cloud VCNs within and across tenancies
//!
//! A single-binary tool that creates local peering gateways, connects them,
//! authorizes cross-tenancy peering and adds the route rules that make two
//! VCNs reach each other. Read-only listings help find the identifiers.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Resolve → Create → Authorize → Connect → Route
//! - [`core`] - Domain types, commands, configuration and paths
//! - [`cloud`] - Abstraction over the cloud control plane (OCI and mock)
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. Commands are validated before any configuration is read
//! 2. Configuration errors surface before any cloud call
//! 3. Peering steps run in a fixed order and stop at the first failure

pub mod cli;
pub mod cloud;
pub mod core;
pub mod engine;
pub mod ui;
