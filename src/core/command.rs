//! core::command
//!
//! The command model: one immutable value per supported operation.
//!
//! # Design
//!
//! [`Command`] is a closed enum matched exhaustively by the CLI dispatcher.
//! Every variant carries the credential reference(s) it needs and, for the
//! peering variants, a shared [`PeeringTargets`] block.
//!
//! Construction is the only place input is validated:
//! - Peering commands require a CIDR for both sides
//! - Inter-tenancy commands require both credential profiles
//!
//! Identical requestor and acceptor profiles are accepted; peering a
//! tenancy with itself through the cross-tenancy path is unusual but valid.
//!
//! # Example
//!
//! ```
//! use peer_oracle_vcn::core::command::{Command, Credentials, PeeringTargets};
//! use std::path::PathBuf;
//!
//! let targets = PeeringTargets::builder()
//!     .requestor_cidr("10.0.0.0/24")
//!     .acceptor_cidr("10.1.0.0/24")
//!     .build()
//!     .unwrap();
//!
//! let cmd = Command::peer_within_tenant(
//!     Credentials::new(PathBuf::from("/home/me/.oci/config"), "DEFAULT"),
//!     targets,
//! )
//! .unwrap();
//! assert_eq!(cmd.name(), "intra_tenant");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{Cidr, Ocid, TypeError};

/// Errors from command construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("missing required CIDR for {0}")]
    MissingCidr(Side),

    #[error("missing credential profile for {0}")]
    MissingProfile(Side),

    #[error(transparent)]
    InvalidValue(#[from] TypeError),
}

/// Which end of a peering connection a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The side that initiates the connection
    Requestor,
    /// The side that accepts the connection
    Acceptor,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Requestor => write!(f, "requestor"),
            Side::Acceptor => write!(f, "acceptor"),
        }
    }
}

/// Reference to one profile inside an OCI config file.
///
/// The command layer never opens the file; `core::config` does that
/// before any cloud call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    config_file: PathBuf,
    profile: String,
}

impl Credentials {
    /// Create a credential reference.
    pub fn new(config_file: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            config_file: config_file.into(),
            profile: profile.into(),
        }
    }

    /// Path to the config file.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Profile (section) name inside the config file.
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl std::fmt::Display for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.config_file.display(), self.profile)
    }
}

/// Identifiers and route destinations shared by both peering variants.
///
/// Identifiers are optional; the orchestrator resolves missing ones.
/// Both CIDRs are always present once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringTargets {
    pub requestor_vcn: Option<Ocid>,
    pub acceptor_vcn: Option<Ocid>,
    pub requestor_group: Option<Ocid>,
    pub requestor_route_table: Option<Ocid>,
    pub acceptor_route_table: Option<Ocid>,
    /// Destination added to the acceptor's route table
    pub requestor_cidr: Cidr,
    /// Destination added to the requestor's route table
    pub acceptor_cidr: Cidr,
}

impl PeeringTargets {
    /// Start building a target block.
    pub fn builder() -> PeeringTargetsBuilder {
        PeeringTargetsBuilder::default()
    }
}

/// Builder for [`PeeringTargets`].
///
/// Values are kept as raw strings until [`build`](Self::build) so that a
/// missing CIDR and a malformed one are reported distinctly.
#[derive(Debug, Clone, Default)]
pub struct PeeringTargetsBuilder {
    requestor_vcn: Option<String>,
    acceptor_vcn: Option<String>,
    requestor_group: Option<String>,
    requestor_route_table: Option<String>,
    acceptor_route_table: Option<String>,
    requestor_cidr: Option<String>,
    acceptor_cidr: Option<String>,
}

impl PeeringTargetsBuilder {
    pub fn requestor_vcn(mut self, ocid: impl Into<String>) -> Self {
        self.requestor_vcn = Some(ocid.into());
        self
    }

    pub fn acceptor_vcn(mut self, ocid: impl Into<String>) -> Self {
        self.acceptor_vcn = Some(ocid.into());
        self
    }

    pub fn requestor_group(mut self, ocid: impl Into<String>) -> Self {
        self.requestor_group = Some(ocid.into());
        self
    }

    pub fn requestor_route_table(mut self, ocid: impl Into<String>) -> Self {
        self.requestor_route_table = Some(ocid.into());
        self
    }

    pub fn acceptor_route_table(mut self, ocid: impl Into<String>) -> Self {
        self.acceptor_route_table = Some(ocid.into());
        self
    }

    pub fn requestor_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.requestor_cidr = Some(cidr.into());
        self
    }

    pub fn acceptor_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.acceptor_cidr = Some(cidr.into());
        self
    }

    /// Validate and freeze the target block.
    ///
    /// # Errors
    ///
    /// - `CommandError::MissingCidr` if either CIDR is absent or blank
    /// - `CommandError::InvalidValue` if an identifier or CIDR is malformed
    pub fn build(self) -> Result<PeeringTargets, CommandError> {
        let requestor_cidr = required_cidr(self.requestor_cidr, Side::Requestor)?;
        let acceptor_cidr = required_cidr(self.acceptor_cidr, Side::Acceptor)?;

        Ok(PeeringTargets {
            requestor_vcn: optional_ocid(self.requestor_vcn)?,
            acceptor_vcn: optional_ocid(self.acceptor_vcn)?,
            requestor_group: optional_ocid(self.requestor_group)?,
            requestor_route_table: optional_ocid(self.requestor_route_table)?,
            acceptor_route_table: optional_ocid(self.acceptor_route_table)?,
            requestor_cidr,
            acceptor_cidr,
        })
    }
}

fn required_cidr(value: Option<String>, side: Side) -> Result<Cidr, CommandError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Cidr::new(&v)?),
        _ => Err(CommandError::MissingCidr(side)),
    }
}

fn optional_ocid(value: Option<String>) -> Result<Option<Ocid>, CommandError> {
    value.map(Ocid::new).transpose().map_err(Into::into)
}

/// A requested operation with everything needed to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Peer two VCNs inside one tenancy.
    PeerWithinTenant {
        credentials: Credentials,
        targets: PeeringTargets,
    },
    /// Peer two VCNs that live in different tenancies.
    PeerInterTenancies {
        requestor: Credentials,
        acceptor: Credentials,
        targets: PeeringTargets,
    },
    /// List VCNs visible to a profile.
    ListVcns { credentials: Credentials },
    /// List IAM groups of a profile's tenancy.
    ListGroups { credentials: Credentials },
    /// List route tables, optionally scoped to one VCN.
    ListRouteTables {
        credentials: Credentials,
        vcn: Option<Ocid>,
    },
}

impl Command {
    /// Build an intra-tenant peering command.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MissingProfile` if the profile name is blank.
    pub fn peer_within_tenant(
        credentials: Credentials,
        targets: PeeringTargets,
    ) -> Result<Self, CommandError> {
        require_profile(&credentials, Side::Requestor)?;
        Ok(Command::PeerWithinTenant {
            credentials,
            targets,
        })
    }

    /// Build an inter-tenancy peering command.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MissingProfile` naming the side whose profile
    /// name is blank.
    pub fn peer_inter_tenancies(
        requestor: Credentials,
        acceptor: Credentials,
        targets: PeeringTargets,
    ) -> Result<Self, CommandError> {
        require_profile(&requestor, Side::Requestor)?;
        require_profile(&acceptor, Side::Acceptor)?;
        Ok(Command::PeerInterTenancies {
            requestor,
            acceptor,
            targets,
        })
    }

    /// Get the CLI sub-command name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PeerWithinTenant { .. } => "intra_tenant",
            Command::PeerInterTenancies { .. } => "inter_tenant",
            Command::ListVcns { .. } => "list_vcn",
            Command::ListGroups { .. } => "list_group",
            Command::ListRouteTables { .. } => "list_route_table",
        }
    }
}

fn require_profile(credentials: &Credentials, side: Side) -> Result<(), CommandError> {
    if credentials.profile().trim().is_empty() {
        return Err(CommandError::MissingProfile(side));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(profile: &str) -> Credentials {
        Credentials::new("/tmp/oci-config", profile)
    }

    fn cidrs() -> PeeringTargetsBuilder {
        PeeringTargets::builder()
            .requestor_cidr("10.0.0.0/24")
            .acceptor_cidr("10.1.0.0/24")
    }

    #[test]
    fn builder_with_only_cidrs() {
        let targets = cidrs().build().unwrap();
        assert!(targets.requestor_vcn.is_none());
        assert!(targets.acceptor_route_table.is_none());
        assert_eq!(targets.requestor_cidr.to_string(), "10.0.0.0/24");
        assert_eq!(targets.acceptor_cidr.to_string(), "10.1.0.0/24");
    }

    #[test]
    fn builder_keeps_identifiers() {
        let targets = cidrs()
            .requestor_vcn("ocid1.vcn.oc1.iad.req")
            .acceptor_vcn("ocid1.vcn.oc1.iad.acc")
            .requestor_group("ocid1.group.oc1..grp")
            .build()
            .unwrap();
        assert_eq!(
            targets.requestor_vcn.as_ref().map(Ocid::as_str),
            Some("ocid1.vcn.oc1.iad.req")
        );
        assert_eq!(
            targets.requestor_group.as_ref().map(Ocid::as_str),
            Some("ocid1.group.oc1..grp")
        );
    }

    #[test]
    fn missing_requestor_cidr_rejected() {
        let result = PeeringTargets::builder()
            .acceptor_cidr("10.1.0.0/24")
            .build();
        assert_eq!(result, Err(CommandError::MissingCidr(Side::Requestor)));
    }

    #[test]
    fn missing_acceptor_cidr_rejected() {
        let result = PeeringTargets::builder()
            .requestor_cidr("10.0.0.0/24")
            .build();
        assert_eq!(result, Err(CommandError::MissingCidr(Side::Acceptor)));
    }

    #[test]
    fn blank_cidr_counts_as_missing() {
        let result = PeeringTargets::builder()
            .requestor_cidr("  ")
            .acceptor_cidr("10.1.0.0/24")
            .build();
        assert_eq!(result, Err(CommandError::MissingCidr(Side::Requestor)));
    }

    #[test]
    fn malformed_cidr_rejected() {
        let result = PeeringTargets::builder()
            .requestor_cidr("10.0.0.0")
            .acceptor_cidr("10.1.0.0/24")
            .build();
        assert!(matches!(result, Err(CommandError::InvalidValue(_))));
    }

    #[test]
    fn malformed_ocid_rejected() {
        let result = cidrs().requestor_vcn("vcn-123").build();
        assert!(matches!(
            result,
            Err(CommandError::InvalidValue(TypeError::InvalidOcid(_)))
        ));
    }

    #[test]
    fn intra_tenant_requires_profile() {
        let result = Command::peer_within_tenant(creds(""), cidrs().build().unwrap());
        assert_eq!(result, Err(CommandError::MissingProfile(Side::Requestor)));
    }

    #[test]
    fn inter_tenancies_requires_both_profiles() {
        let targets = cidrs().build().unwrap();
        assert_eq!(
            Command::peer_inter_tenancies(creds(""), creds("B"), targets.clone()),
            Err(CommandError::MissingProfile(Side::Requestor))
        );
        assert_eq!(
            Command::peer_inter_tenancies(creds("A"), creds(" "), targets),
            Err(CommandError::MissingProfile(Side::Acceptor))
        );
    }

    #[test]
    fn inter_tenancies_accepts_identical_profiles() {
        let cmd =
            Command::peer_inter_tenancies(creds("SAME"), creds("SAME"), cidrs().build().unwrap());
        assert!(cmd.is_ok());
    }

    #[test]
    fn names_match_subcommands() {
        let c = creds("DEFAULT");
        assert_eq!(Command::ListVcns { credentials: c.clone() }.name(), "list_vcn");
        assert_eq!(Command::ListGroups { credentials: c.clone() }.name(), "list_group");
        assert_eq!(
            Command::ListRouteTables {
                credentials: c,
                vcn: None
            }
            .name(),
            "list_route_table"
        );
    }

    #[test]
    fn credentials_display() {
        let c = Credentials::new("/home/u/.oci/config", "PROD");
        assert_eq!(c.to_string(), "/home/u/.oci/config[PROD]");
    }

    #[test]
    fn command_error_display() {
        assert_eq!(
            CommandError::MissingCidr(Side::Acceptor).to_string(),
            "missing required CIDR for acceptor"
        );
        assert_eq!(
            CommandError::MissingProfile(Side::Requestor).to_string(),
            "missing credential profile for requestor"
        );
    }
}
