//! engine::peering
//!
//! Intra-tenant and inter-tenant peering workflows.
//!
//! Both workflows issue their gateway calls strictly in sequence and stop
//! at the first error. Each call is wrapped by [`step`], which logs the step
//! and tags a failure with the [`PeeringStep`] it came from.

use std::future::Future;

use super::resolve::{resolve_group, resolve_vcn, PeeringRequest};
use super::{EngineError, PeeringStep};
use crate::cloud::{CloudError, CloudGateway};
use crate::core::command::{PeeringTargets, Side};
use crate::core::types::Ocid;

/// Outcome of a successful peering run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringReport {
    /// What was peered
    pub request: PeeringRequest,
    /// Local peering gateway on the requestor VCN
    pub requestor_lpg: Ocid,
    /// Local peering gateway on the acceptor VCN
    pub acceptor_lpg: Ocid,
}

/// Run one gateway call as a named step.
async fn step<T, F>(step: PeeringStep, call: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, CloudError>>,
{
    tracing::info!(step = %step, "peering step");
    call.await.map_err(|source| {
        tracing::debug!(step = %step, error = %source, "peering step failed");
        EngineError::Step { step, source }
    })
}

/// Peer two VCNs that share one set of credentials.
///
/// Calls, in order: `list_vcns`, create the requestor gateway, create the
/// acceptor gateway, connect, then one route rule per side.
///
/// # Errors
///
/// - `EngineError::Resolve` if a VCN cannot be resolved
/// - `EngineError::Step` naming the first gateway call that failed
pub async fn create_lpg_intra_tenant(
    gateway: &dyn CloudGateway,
    targets: &PeeringTargets,
) -> Result<PeeringReport, EngineError> {
    if let Some(group) = &targets.requestor_group {
        tracing::debug!(%group, "requestor group is not used for intra-tenant peering");
    }

    let vcns = step(PeeringStep::ResolveVcns, gateway.list_vcns()).await?;
    let requestor_vcn = resolve_vcn(
        &vcns,
        targets.requestor_vcn.as_ref(),
        targets.acceptor_vcn.as_ref(),
        &targets.requestor_cidr,
        Side::Requestor,
    )?;
    let acceptor_vcn = resolve_vcn(
        &vcns,
        targets.acceptor_vcn.as_ref(),
        Some(&requestor_vcn),
        &targets.acceptor_cidr,
        Side::Acceptor,
    )?;
    let request = PeeringRequest::new(targets, requestor_vcn, acceptor_vcn, None)?;
    tracing::info!(
        requestor_vcn = %request.requestor_vcn,
        acceptor_vcn = %request.acceptor_vcn,
        "peering VCNs within tenancy {}",
        gateway.tenancy_id()
    );

    let requestor_lpg = step(
        PeeringStep::CreateRequestorGateway,
        gateway.create_or_get_local_peering_gateway(&request.requestor_vcn),
    )
    .await?;
    let acceptor_lpg = step(
        PeeringStep::CreateAcceptorGateway,
        gateway.create_or_get_local_peering_gateway(&request.acceptor_vcn),
    )
    .await?;

    step(
        PeeringStep::ConnectGateways,
        gateway.connect_peering_gateways(&requestor_lpg, &acceptor_lpg),
    )
    .await?;

    add_routes(gateway, gateway, &request, &requestor_lpg, &acceptor_lpg).await?;

    Ok(PeeringReport {
        request,
        requestor_lpg,
        acceptor_lpg,
    })
}

/// Peer two VCNs in different tenancies.
///
/// `requestor` and `acceptor` are gateways bound to each side's
/// credentials. The acceptance is issued exactly once, with the acceptor's
/// credentials, after both gateways exist and before connecting.
///
/// # Errors
///
/// - `EngineError::Resolve` if a VCN or the requestor group cannot be resolved
/// - `EngineError::Step` naming the first gateway call that failed
pub async fn create_lpg_inter_tenant(
    requestor: &dyn CloudGateway,
    acceptor: &dyn CloudGateway,
    targets: &PeeringTargets,
) -> Result<PeeringReport, EngineError> {
    let requestor_vcns = step(PeeringStep::ResolveRequestorVcns, requestor.list_vcns()).await?;
    let acceptor_vcns = step(PeeringStep::ResolveAcceptorVcns, acceptor.list_vcns()).await?;
    let requestor_vcn = resolve_vcn(
        &requestor_vcns,
        targets.requestor_vcn.as_ref(),
        None,
        &targets.requestor_cidr,
        Side::Requestor,
    )?;
    let acceptor_vcn = resolve_vcn(
        &acceptor_vcns,
        targets.acceptor_vcn.as_ref(),
        None,
        &targets.acceptor_cidr,
        Side::Acceptor,
    )?;

    let requestor_group = match &targets.requestor_group {
        Some(group) => group.clone(),
        None => {
            let groups = step(PeeringStep::ResolveGroup, requestor.list_groups()).await?;
            resolve_group(&groups)?
        }
    };

    let request =
        PeeringRequest::new(targets, requestor_vcn, acceptor_vcn, Some(requestor_group.clone()))?;
    tracing::info!(
        requestor_vcn = %request.requestor_vcn,
        acceptor_vcn = %request.acceptor_vcn,
        "peering VCNs of tenancy {} and tenancy {}",
        requestor.tenancy_id(),
        acceptor.tenancy_id()
    );

    let requestor_lpg = step(
        PeeringStep::CreateRequestorGateway,
        requestor.create_or_get_local_peering_gateway(&request.requestor_vcn),
    )
    .await?;
    let acceptor_lpg = step(
        PeeringStep::CreateAcceptorGateway,
        acceptor.create_or_get_local_peering_gateway(&request.acceptor_vcn),
    )
    .await?;

    step(
        PeeringStep::RequestCrossTenancy,
        requestor.request_cross_tenancy_peering(
            &requestor_lpg,
            &requestor_group,
            acceptor.tenancy_id(),
        ),
    )
    .await?;
    step(
        PeeringStep::AcceptCrossTenancy,
        acceptor.accept_cross_tenancy_peering(
            &acceptor_lpg,
            &requestor_group,
            requestor.tenancy_id(),
        ),
    )
    .await?;

    step(
        PeeringStep::ConnectGateways,
        requestor.connect_peering_gateways(&requestor_lpg, &acceptor_lpg),
    )
    .await?;

    add_routes(requestor, acceptor, &request, &requestor_lpg, &acceptor_lpg).await?;

    Ok(PeeringReport {
        request,
        requestor_lpg,
        acceptor_lpg,
    })
}

/// Point each side's route table at its own gateway for the peer's CIDR.
async fn add_routes(
    requestor: &dyn CloudGateway,
    acceptor: &dyn CloudGateway,
    request: &PeeringRequest,
    requestor_lpg: &Ocid,
    acceptor_lpg: &Ocid,
) -> Result<(), EngineError> {
    step(
        PeeringStep::AddRequestorRoute,
        requestor.add_route_rule(
            &request.requestor_route_table,
            &request.acceptor_cidr,
            requestor_lpg,
        ),
    )
    .await?;
    step(
        PeeringStep::AddAcceptorRoute,
        acceptor.add_route_rule(
            &request.acceptor_route_table,
            &request.requestor_cidr,
            acceptor_lpg,
        ),
    )
    .await
}
