//! cloud
//!
//! Abstraction over the cloud control plane that owns VCNs, peering
//! gateways, route tables and IAM groups.
//!
//! # Architecture
//!
//! The `CloudGateway` trait defines every call the peering and listing
//! workflows make. Commands use the [`create_gateway`] factory function
//! rather than importing the OCI client directly, and orchestration tests
//! substitute [`mock::MockCloud`].
//!
//! # Modules
//!
//! - `traits`: Core `CloudGateway` trait, `CloudError` and summary types
//! - [`oci`]: OCI implementation over the Core Services and Identity REST APIs
//! - [`signer`]: OCI HTTP Signature request signing
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Gateway creation from credentials

mod factory;
pub mod mock;
pub mod oci;
pub mod signer;
mod traits;

pub use factory::create_gateway;
pub use traits::*;
