//! engine::listing
//!
//! Read-only listing workflows. Each is a single gateway call.

use super::EngineError;
use crate::cloud::{CloudGateway, GroupSummary, RouteTableSummary, VcnSummary};
use crate::core::types::Ocid;

/// List VCNs visible to the gateway's credentials.
pub async fn list_vcns(gateway: &dyn CloudGateway) -> Result<Vec<VcnSummary>, EngineError> {
    let vcns = gateway.list_vcns().await?;
    tracing::debug!(count = vcns.len(), "listed VCNs");
    Ok(vcns)
}

/// List IAM groups of the gateway's tenancy.
pub async fn list_groups(gateway: &dyn CloudGateway) -> Result<Vec<GroupSummary>, EngineError> {
    let groups = gateway.list_groups().await?;
    tracing::debug!(count = groups.len(), "listed groups");
    Ok(groups)
}

/// List route tables of one VCN, or of every visible VCN.
pub async fn list_route_tables(
    gateway: &dyn CloudGateway,
    vcn: Option<&Ocid>,
) -> Result<Vec<RouteTableSummary>, EngineError> {
    let tables = gateway.list_route_tables(vcn).await?;
    tracing::debug!(count = tables.len(), vcn = ?vcn.map(Ocid::as_str), "listed route tables");
    Ok(tables)
}
