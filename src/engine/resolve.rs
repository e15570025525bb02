//! engine::resolve
//!
//! Turns optional peering identifiers into a concrete [`PeeringRequest`].
//!
//! Resolution works on listings the orchestrator already fetched, so it is
//! pure: given VCN ids are checked against the listing, missing ones are
//! filled in when exactly one available VCN holds the side's CIDR, and
//! missing route tables become a reference to the VCN's default table.

use super::EngineError;
use crate::cloud::{GroupSummary, RouteTableRef, VcnSummary};
use crate::core::command::{PeeringTargets, Side};
use crate::core::types::{Cidr, Ocid};

/// A fully resolved peering request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringRequest {
    pub requestor_vcn: Ocid,
    pub acceptor_vcn: Ocid,
    /// Only set for cross-tenancy peering
    pub requestor_group: Option<Ocid>,
    pub requestor_route_table: RouteTableRef,
    pub acceptor_route_table: RouteTableRef,
    pub requestor_cidr: Cidr,
    pub acceptor_cidr: Cidr,
}

impl PeeringRequest {
    /// Assemble a request from resolved VCNs and the user's targets.
    pub fn new(
        targets: &PeeringTargets,
        requestor_vcn: Ocid,
        acceptor_vcn: Ocid,
        requestor_group: Option<Ocid>,
    ) -> Result<Self, EngineError> {
        if requestor_vcn == acceptor_vcn {
            return Err(EngineError::Resolve(format!(
                "requestor and acceptor VCN are the same ({requestor_vcn})"
            )));
        }

        Ok(Self {
            requestor_route_table: route_table_ref(
                targets.requestor_route_table.as_ref(),
                &requestor_vcn,
            ),
            acceptor_route_table: route_table_ref(
                targets.acceptor_route_table.as_ref(),
                &acceptor_vcn,
            ),
            requestor_vcn,
            acceptor_vcn,
            requestor_group,
            requestor_cidr: targets.requestor_cidr,
            acceptor_cidr: targets.acceptor_cidr,
        })
    }
}

fn vcn_flag(side: Side) -> &'static str {
    match side {
        Side::Requestor => "--requestor-vcn-ocid",
        Side::Acceptor => "--acceptor-vcn-ocid",
    }
}

/// Validate or pick the VCN for one side.
///
/// A given id must appear in `listed`. Without one, candidates are the
/// AVAILABLE VCNs other than `exclude` whose CIDR blocks overlap `cidr`;
/// exactly one must remain.
pub fn resolve_vcn(
    listed: &[VcnSummary],
    given: Option<&Ocid>,
    exclude: Option<&Ocid>,
    cidr: &Cidr,
    side: Side,
) -> Result<Ocid, EngineError> {
    if let Some(id) = given {
        return if listed.iter().any(|v| &v.id == id) {
            Ok(id.clone())
        } else {
            Err(EngineError::Resolve(format!(
                "{side} VCN {id} is not visible to the {side} credentials"
            )))
        };
    }

    let candidates: Vec<&VcnSummary> = listed
        .iter()
        .filter(|v| Some(&v.id) != exclude)
        .filter(|v| v.lifecycle_state == AVAILABLE)
        .filter(|v| covers(v, cidr))
        .collect();

    match candidates.as_slice() {
        [only] => {
            tracing::debug!(%side, vcn = %only.id, %cidr, "resolved VCN");
            Ok(only.id.clone())
        }
        [] => Err(EngineError::Resolve(format!(
            "no available {side} VCN holds {cidr}; pass {}",
            vcn_flag(side)
        ))),
        many => Err(EngineError::Resolve(format!(
            "{} candidate {side} VCNs for {cidr} ({}); pass {}",
            many.len(),
            many.iter()
                .map(|v| format!("{} [{}]", v.id, v.display_name))
                .collect::<Vec<_>>()
                .join(", "),
            vcn_flag(side)
        ))),
    }
}

const AVAILABLE: &str = "AVAILABLE";

/// Whether any of the VCN's blocks overlaps `cidr`. Unparseable blocks are skipped.
fn covers(vcn: &VcnSummary, cidr: &Cidr) -> bool {
    vcn.cidr_blocks
        .iter()
        .filter_map(|block| Cidr::new(block).ok())
        .any(|block| block.overlaps(cidr))
}

/// Pick the requestor group when exactly one group exists.
pub fn resolve_group(groups: &[GroupSummary]) -> Result<Ocid, EngineError> {
    match groups {
        [only] => {
            tracing::debug!(group = %only.id, "resolved requestor group");
            Ok(only.id.clone())
        }
        [] => Err(EngineError::Resolve(
            "no requestor group found; pass --requestor-group-ocid".into(),
        )),
        many => Err(EngineError::Resolve(format!(
            "{} candidate requestor groups ({}); pass --requestor-group-ocid",
            many.len(),
            many.iter()
                .map(|g| format!("{} [{}]", g.id, g.name))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// An explicit route table, or the VCN's default one.
pub fn route_table_ref(given: Option<&Ocid>, vcn: &Ocid) -> RouteTableRef {
    match given {
        Some(id) => RouteTableRef::Table(id.clone()),
        None => RouteTableRef::VcnDefault(vcn.clone()),
    }
}
