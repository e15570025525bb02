//! core
//!
//! Core domain types, commands and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Ocid, Cidr
//! - [`command`] - The validated command model
//! - [`config`] - OCI config file schema and loading
//! - [`paths`] - Default locations and home expansion
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing in this module touches the network

pub mod command;
pub mod config;
pub mod paths;
pub mod types;
