//! engine
//!
//! Orchestrates the peering and listing workflows over a `CloudGateway`.
//!
//! # Architecture
//!
//! Every peering command follows the same lifecycle:
//!
//! ```text
//! Resolve -> Create gateways -> [Authorize] -> Connect -> Route
//! ```
//!
//! 1. **Resolve**: list VCNs (and groups when needed) and turn the optional
//!    identifiers of [`PeeringTargets`] into a [`PeeringRequest`]
//! 2. **Create gateways**: one local peering gateway per VCN
//! 3. **Authorize**: cross-tenancy only; IAM policies on both sides
//! 4. **Connect**: requestor gateway to acceptor gateway
//! 5. **Route**: one rule per side pointing the peer's CIDR at its gateway
//!
//! # Invariants
//!
//! - Connect happens after both gateways exist and before either route rule
//! - The first failing step aborts the run; later steps are never issued
//! - Nothing is rolled back; the error names the step that failed
//!
//! [`PeeringTargets`]: crate::core::command::PeeringTargets
//!
//! # Example
//!
//! ```
//! use peer_oracle_vcn::cloud::mock::MockCloud;
//! use peer_oracle_vcn::core::command::PeeringTargets;
//! use peer_oracle_vcn::core::types::Ocid;
//! use peer_oracle_vcn::engine::peering::create_lpg_intra_tenant;
//!
//! # tokio_test::block_on(async {
//! let a = Ocid::new("ocid1.vcn.oc1.iad.aaaa").unwrap();
//! let b = Ocid::new("ocid1.vcn.oc1.iad.bbbb").unwrap();
//! let cloud = MockCloud::new(Ocid::new("ocid1.tenancy.oc1..acme").unwrap())
//!     .with_vcn(MockCloud::vcn(&a, "a", "10.0.0.0/16"))
//!     .with_vcn(MockCloud::vcn(&b, "b", "10.1.0.0/16"));
//!
//! let targets = PeeringTargets::builder()
//!     .requestor_vcn(a.as_str())
//!     .acceptor_vcn(b.as_str())
//!     .requestor_cidr("10.0.0.0/16")
//!     .acceptor_cidr("10.1.0.0/16")
//!     .build()
//!     .unwrap();
//!
//! let report = create_lpg_intra_tenant(&cloud, &targets).await.unwrap();
//! assert_eq!(report.request.requestor_vcn, a);
//! # });
//! ```

pub mod listing;
pub mod peering;
pub mod resolve;

pub use peering::{create_lpg_inter_tenant, create_lpg_intra_tenant, PeeringReport};
pub use resolve::PeeringRequest;

use crate::cloud::CloudError;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled (`--verbose`).
    pub verbose: bool,
}

/// One step of a peering run, used to report where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeeringStep {
    /// Listing VCNs of the single intra-tenant profile
    ResolveVcns,
    ResolveRequestorVcns,
    ResolveAcceptorVcns,
    ResolveGroup,
    CreateRequestorGateway,
    CreateAcceptorGateway,
    RequestCrossTenancy,
    AcceptCrossTenancy,
    ConnectGateways,
    AddRequestorRoute,
    AddAcceptorRoute,
}

impl PeeringStep {
    /// Human-readable description of the step.
    pub fn describe(&self) -> &'static str {
        match self {
            PeeringStep::ResolveVcns => "listing VCNs",
            PeeringStep::ResolveRequestorVcns => "listing requestor VCNs",
            PeeringStep::ResolveAcceptorVcns => "listing acceptor VCNs",
            PeeringStep::ResolveGroup => "listing groups",
            PeeringStep::CreateRequestorGateway => "creating requestor local peering gateway",
            PeeringStep::CreateAcceptorGateway => "creating acceptor local peering gateway",
            PeeringStep::RequestCrossTenancy => "authorizing requestor for cross-tenancy peering",
            PeeringStep::AcceptCrossTenancy => "accepting cross-tenancy peering",
            PeeringStep::ConnectGateways => "connecting local peering gateways",
            PeeringStep::AddRequestorRoute => "adding route rule to requestor route table",
            PeeringStep::AddAcceptorRoute => "adding route rule to acceptor route table",
        }
    }
}

impl std::fmt::Display for PeeringStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A cloud call of a peering run failed.
    #[error("{step} failed: {source}")]
    Step {
        step: PeeringStep,
        source: CloudError,
    },

    /// An identifier could not be resolved or validated.
    #[error("resolution failed: {0}")]
    Resolve(String),

    /// A listing call failed.
    #[error("listing failed: {0}")]
    Listing(#[from] CloudError),
}

impl EngineError {
    /// The step a peering run stopped at, if it failed in a cloud call.
    pub fn step(&self) -> Option<PeeringStep> {
        match self {
            EngineError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_names_step_and_cause() {
        let err = EngineError::Step {
            step: PeeringStep::ConnectGateways,
            source: CloudError::RateLimited,
        };
        assert_eq!(
            err.to_string(),
            "connecting local peering gateways failed: rate limited"
        );
        assert_eq!(err.step(), Some(PeeringStep::ConnectGateways));
    }

    #[test]
    fn step_error_exposes_source() {
        use std::error::Error;
        let err = EngineError::Step {
            step: PeeringStep::AddAcceptorRoute,
            source: CloudError::NotFound("route table".into()),
        };
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "not found: route table");
    }

    #[test]
    fn listing_error_from_cloud_error() {
        let err: EngineError = CloudError::AuthFailed("bad key".into()).into();
        assert!(matches!(err, EngineError::Listing(_)));
        assert_eq!(err.step(), None);
    }

    #[test]
    fn vcn_listing_steps_name_the_side() {
        let err = EngineError::Step {
            step: PeeringStep::ResolveAcceptorVcns,
            source: CloudError::AuthFailed("bad key".into()),
        };
        assert_eq!(
            err.to_string(),
            "listing acceptor VCNs failed: authentication failed: bad key"
        );
        assert_eq!(PeeringStep::ResolveRequestorVcns.describe(), "listing requestor VCNs");
    }

    #[test]
    fn context_default_is_quiet() {
        assert!(!Context::default().verbose);
    }
}
