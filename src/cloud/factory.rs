//! cloud::factory
//!
//! Gateway creation from credentials.
//!
//! # Design
//!
//! Commands use [`create_gateway`] instead of constructing `OciClient`
//! directly, so the profile is loaded and the key is parsed in one place and
//! every configuration problem surfaces as a `ConfigError` before the first
//! network call.
//!
//! # Example
//!
//! ```ignore
//! use peer_oracle_vcn::cloud::create_gateway;
//! use peer_oracle_vcn::core::command::Credentials;
//!
//! let gateway = create_gateway(&Credentials::new("/home/me/.oci/config", "DEFAULT"))?;
//! let vcns = gateway.list_vcns().await?;
//! ```

use super::oci::OciClient;
use super::signer::RequestSigner;
use super::traits::CloudGateway;
use crate::core::command::Credentials;
use crate::core::config::{load_profile, ConfigError, OciProfile};

/// Create a gateway for a credential reference.
///
/// # Errors
///
/// Any `ConfigError` from loading the profile or its private key.
pub fn create_gateway(credentials: &Credentials) -> Result<Box<dyn CloudGateway>, ConfigError> {
    let profile = load_profile(credentials)?;
    tracing::debug!(
        credentials = %credentials,
        tenancy = %profile.tenancy,
        region = %profile.region,
        "loaded OCI profile"
    );
    gateway_for_profile(&profile)
}

/// Create a gateway for an already loaded profile.
fn gateway_for_profile(profile: &OciProfile) -> Result<Box<dyn CloudGateway>, ConfigError> {
    let signer = RequestSigner::from_profile(profile)?;
    Ok(Box::new(OciClient::new(profile, signer)))
}
