//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Common Flags
//!
//! These flags are available on every sub-command:
//! - `--api-config-file <path>`: OCI config file (default `~/.oci/config`)
//! - `--verbose`: Enable debug logging
//!
//! Values are validated while parsing: the config file must exist, OCIDs
//! and CIDRs must be well formed. Any failure is a usage error (exit 2).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::command::{Command, CommandError, Credentials, PeeringTargets};
use crate::core::paths::{expand_home, DEFAULT_CONFIG_LOCATION, DEFAULT_PROFILE};
use crate::core::types::{Cidr, Ocid};

/// Peer Oracle Cloud VCNs within a tenancy or across two tenancies
#[derive(Parser, Debug)]
#[command(name = "peer-oracle-vcn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommand,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available sub-commands.
#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Peer two VCNs in the same tenancy
    #[command(
        name = "intra_tenant",
        after_help = "\
EXAMPLES:
    # Peer the DEFAULT profile's VCNs holding these two CIDRs
    peer-oracle-vcn intra_tenant --requestor-cidr 10.0.0.0/16 --acceptor-cidr 10.1.0.0/16

    # Pick VCNs and a route table explicitly
    peer-oracle-vcn intra_tenant --profile PROD \\
        --requestor-vcn-ocid ocid1.vcn.oc1.iad.aaaa --acceptor-vcn-ocid ocid1.vcn.oc1.iad.bbbb \\
        --requestor-route-table-ocid ocid1.routetable.oc1.iad.rrrr \\
        --requestor-cidr 10.0.0.0/16 --acceptor-cidr 10.1.0.0/16"
    )]
    IntraTenant {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        peering: PeeringArgs,

        /// Profile in the config file
        #[arg(long, value_name = "PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// Peer two VCNs in different tenancies
    #[command(name = "inter_tenant")]
    InterTenant {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        peering: PeeringArgs,

        /// Profile holding the requestor tenancy's credentials
        #[arg(long, value_name = "PROFILE")]
        requestor_profile: String,

        /// Profile holding the acceptor tenancy's credentials
        #[arg(long, value_name = "PROFILE")]
        acceptor_profile: String,
    },

    /// List VCNs visible to a profile
    #[command(name = "list_vcn")]
    ListVcn {
        #[command(flatten)]
        common: CommonArgs,

        /// Profile in the config file
        #[arg(long, value_name = "PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// List IAM groups of a profile's tenancy
    #[command(name = "list_group")]
    ListGroup {
        #[command(flatten)]
        common: CommonArgs,

        /// Profile in the config file
        #[arg(long, value_name = "PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// List route tables, optionally of one VCN
    #[command(name = "list_route_table")]
    ListRouteTable {
        #[command(flatten)]
        common: CommonArgs,

        /// Profile in the config file
        #[arg(long, value_name = "PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,

        /// Only list route tables of this VCN
        #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
        vcn_ocid: Option<Ocid>,
    },
}

/// Flags shared by every sub-command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// OCI API config file path
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_LOCATION,
        value_parser = parse_config_file
    )]
    pub api_config_file: PathBuf,

    /// Increase output verbosity
    #[arg(long)]
    pub verbose: bool,
}

/// Flags shared by both peering sub-commands.
#[derive(Args, Debug, Clone)]
pub struct PeeringArgs {
    /// VCN OCID of requestor
    #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
    pub requestor_vcn_ocid: Option<Ocid>,

    /// VCN OCID of acceptor
    #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
    pub acceptor_vcn_ocid: Option<Ocid>,

    /// Group OCID of requestor
    #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
    pub requestor_group_ocid: Option<Ocid>,

    /// Route table OCID of requestor to register the LPG in
    #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
    pub requestor_route_table_ocid: Option<Ocid>,

    /// Route table OCID of acceptor to register the LPG in
    #[arg(long, value_name = "OCID", value_parser = parse_ocid)]
    pub acceptor_route_table_ocid: Option<Ocid>,

    /// CIDR of requestor, added to the acceptor's route table
    #[arg(long, value_name = "CIDR", value_parser = parse_cidr)]
    pub requestor_cidr: Cidr,

    /// CIDR of acceptor, added to the requestor's route table
    #[arg(long, value_name = "CIDR", value_parser = parse_cidr)]
    pub acceptor_cidr: Cidr,
}

impl From<PeeringArgs> for PeeringTargets {
    fn from(args: PeeringArgs) -> Self {
        PeeringTargets {
            requestor_vcn: args.requestor_vcn_ocid,
            acceptor_vcn: args.acceptor_vcn_ocid,
            requestor_group: args.requestor_group_ocid,
            requestor_route_table: args.requestor_route_table_ocid,
            acceptor_route_table: args.acceptor_route_table_ocid,
            requestor_cidr: args.requestor_cidr,
            acceptor_cidr: args.acceptor_cidr,
        }
    }
}

impl SubCommand {
    /// Flags shared by every sub-command.
    pub fn common(&self) -> &CommonArgs {
        match self {
            SubCommand::IntraTenant { common, .. }
            | SubCommand::InterTenant { common, .. }
            | SubCommand::ListVcn { common, .. }
            | SubCommand::ListGroup { common, .. }
            | SubCommand::ListRouteTable { common, .. } => common,
        }
    }

    /// Build the validated command.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MissingProfile` for a blank profile name.
    pub fn into_command(self) -> Result<Command, CommandError> {
        match self {
            SubCommand::IntraTenant {
                common,
                peering,
                profile,
            } => Command::peer_within_tenant(
                Credentials::new(common.api_config_file, profile),
                peering.into(),
            ),
            SubCommand::InterTenant {
                common,
                peering,
                requestor_profile,
                acceptor_profile,
            } => Command::peer_inter_tenancies(
                Credentials::new(common.api_config_file.clone(), requestor_profile),
                Credentials::new(common.api_config_file, acceptor_profile),
                peering.into(),
            ),
            SubCommand::ListVcn { common, profile } => Ok(Command::ListVcns {
                credentials: Credentials::new(common.api_config_file, profile),
            }),
            SubCommand::ListGroup { common, profile } => Ok(Command::ListGroups {
                credentials: Credentials::new(common.api_config_file, profile),
            }),
            SubCommand::ListRouteTable {
                common,
                profile,
                vcn_ocid,
            } => Ok(Command::ListRouteTables {
                credentials: Credentials::new(common.api_config_file, profile),
                vcn: vcn_ocid,
            }),
        }
    }
}

/// Expand `~` and require an existing regular file.
fn parse_config_file(value: &str) -> Result<PathBuf, String> {
    let path = expand_home(std::path::Path::new(value));
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("{value} is not a file"))
    }
}

fn parse_ocid(value: &str) -> Result<Ocid, String> {
    Ocid::new(value).map_err(|e| e.to_string())
}

fn parse_cidr(value: &str) -> Result<Cidr, String> {
    Cidr::new(value).map_err(|e| e.to_string())
}
