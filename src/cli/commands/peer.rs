//! cli::commands::peer
//!
//! Intra-tenant and inter-tenant peering.
//!
//! # Example
//!
//! ```bash
//! # Same tenancy, VCNs picked by the CIDR they hold
//! peer-oracle-vcn intra_tenant --requestor-cidr 10.0.0.0/16 --acceptor-cidr 10.1.0.0/16
//!
//! # Two tenancies, two profiles in one config file
//! peer-oracle-vcn inter_tenant --requestor-profile ACME --acceptor-profile GLOBEX \
//!     --requestor-cidr 10.0.0.0/16 --acceptor-cidr 172.16.0.0/16
//! ```

use anyhow::{Context as _, Result};

use super::runtime;
use crate::cloud::create_gateway;
use crate::core::command::{Credentials, PeeringTargets};
use crate::engine::{create_lpg_inter_tenant, create_lpg_intra_tenant, Context};
use crate::ui::output;

/// Run the intra-tenant peering command.
///
/// This is a synchronous wrapper that uses tokio to run the async workflow.
pub fn intra_tenant(
    ctx: &Context,
    credentials: &Credentials,
    targets: &PeeringTargets,
) -> Result<()> {
    let gateway = create_gateway(credentials)
        .with_context(|| format!("cannot use credentials {credentials}"))?;

    let report = runtime()?.block_on(create_lpg_intra_tenant(gateway.as_ref(), targets))?;

    output::print(output::format_report(&report));
    if ctx.verbose {
        output::print(format!(
            "  routes: {} -> requestor, {} -> acceptor",
            report.request.requestor_cidr, report.request.acceptor_cidr
        ));
    }
    Ok(())
}

/// Run the inter-tenant peering command.
///
/// Both profiles are loaded before the first cloud call.
pub fn inter_tenant(
    ctx: &Context,
    requestor: &Credentials,
    acceptor: &Credentials,
    targets: &PeeringTargets,
) -> Result<()> {
    let requestor_gateway = create_gateway(requestor)
        .with_context(|| format!("cannot use requestor credentials {requestor}"))?;
    let acceptor_gateway = create_gateway(acceptor)
        .with_context(|| format!("cannot use acceptor credentials {acceptor}"))?;

    let report = runtime()?.block_on(create_lpg_inter_tenant(
        requestor_gateway.as_ref(),
        acceptor_gateway.as_ref(),
        targets,
    ))?;

    output::print(output::format_report(&report));
    if ctx.verbose {
        if let Some(group) = &report.request.requestor_group {
            output::print(format!("  authorized group: {group}"));
        }
    }
    Ok(())
}
