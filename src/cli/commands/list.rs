//! cli::commands::list
//!
//! Read-only listings: VCNs, groups and route tables.

use anyhow::{Context as _, Result};

use super::runtime;
use crate::cloud::create_gateway;
use crate::core::command::Credentials;
use crate::core::types::Ocid;
use crate::engine::listing;
use crate::ui::output;

/// Print every VCN visible to the profile.
pub fn list_vcns(credentials: &Credentials) -> Result<()> {
    let gateway = create_gateway(credentials)
        .with_context(|| format!("cannot use credentials {credentials}"))?;
    let vcns = runtime()?.block_on(listing::list_vcns(gateway.as_ref()))?;
    report_count("VCNs", vcns.len());
    output::print_rows(&vcns)?;
    Ok(())
}

/// Print every IAM group of the profile's tenancy.
pub fn list_groups(credentials: &Credentials) -> Result<()> {
    let gateway = create_gateway(credentials)
        .with_context(|| format!("cannot use credentials {credentials}"))?;
    let groups = runtime()?.block_on(listing::list_groups(gateway.as_ref()))?;
    report_count("groups", groups.len());
    output::print_rows(&groups)?;
    Ok(())
}

/// Print route tables of one VCN, or of every visible VCN.
pub fn list_route_tables(credentials: &Credentials, vcn: Option<&Ocid>) -> Result<()> {
    let gateway = create_gateway(credentials)
        .with_context(|| format!("cannot use credentials {credentials}"))?;
    let tables = runtime()?.block_on(listing::list_route_tables(gateway.as_ref(), vcn))?;
    report_count("route tables", tables.len());
    output::print_rows(&tables)?;
    Ok(())
}

fn report_count(what: &str, count: usize) {
    tracing::debug!("found {count} {what}");
}
