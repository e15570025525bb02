//! cloud::traits
//!
//! Gateway trait definition for the cloud control plane.
//!
//! # Design
//!
//! The `CloudGateway` trait is async because every operation is a network
//! round trip. All methods return `Result` so the orchestrator can stop at
//! the first failure and report which step failed.
//!
//! A gateway is bound to one set of credentials (one tenancy). Inter-tenant
//! peering uses two gateways.
//!
//! Retries, pagination and rate limiting are the implementation's concern;
//! callers see one logical call per method.
//!
//! # Example
//!
//! ```ignore
//! use peer_oracle_vcn::cloud::{CloudGateway, RouteTableRef};
//!
//! async fn peer(gw: &dyn CloudGateway, a: &Ocid, b: &Ocid, cidr: &Cidr) -> Result<(), CloudError> {
//!     let lpg_a = gw.create_or_get_local_peering_gateway(a).await?;
//!     let lpg_b = gw.create_or_get_local_peering_gateway(b).await?;
//!     gw.connect_peering_gateways(&lpg_a, &lpg_b).await?;
//!     gw.add_route_rule(&RouteTableRef::VcnDefault(a.clone()), cidr, &lpg_a).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Cidr, Ocid};

/// Errors from cloud operations.
///
/// These map the failure modes of the OCI REST APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    /// The request signature was rejected (wrong key, fingerprint or clock).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found (or is not visible to this user).
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource changed concurrently or is in a conflicting state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} {code} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// OCI error code (e.g. `InvalidParameter`)
        code: String,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be signed.
    #[error("request signing failed: {0}")]
    Signing(String),
}

/// Which route table a rule is added to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteTableRef {
    /// An explicitly chosen route table
    Table(Ocid),
    /// The default route table of this VCN, looked up by the gateway
    VcnDefault(Ocid),
}

impl std::fmt::Display for RouteTableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteTableRef::Table(id) => write!(f, "{}", id),
            RouteTableRef::VcnDefault(vcn) => write!(f, "default route table of {}", vcn),
        }
    }
}

/// VCN summary returned by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcnSummary {
    pub id: Ocid,
    pub display_name: String,
    pub lifecycle_state: String,
    pub compartment_id: Ocid,
    pub cidr_blocks: Vec<String>,
    pub default_route_table_id: Option<Ocid>,
}

/// IAM group summary returned by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: Ocid,
    pub name: String,
    pub lifecycle_state: String,
    pub description: Option<String>,
}

/// Route table summary returned by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableSummary {
    pub id: Ocid,
    pub display_name: String,
    pub lifecycle_state: String,
    pub vcn_id: Ocid,
    pub rule_count: usize,
}

/// The gateway trait for the cloud control plane.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the CLI drives them from a
/// single-threaded runtime but the trait object is shared by reference.
///
/// # Error Handling
///
/// All methods return `Result<T, CloudError>`. The orchestrator treats
/// every error as fatal for the current run.
#[async_trait]
pub trait CloudGateway: Send + Sync {
    /// Get the gateway name (e.g., "oci", "mock").
    fn name(&self) -> &'static str;

    /// Tenancy the gateway's credentials belong to.
    fn tenancy_id(&self) -> &Ocid;

    /// Return a local peering gateway attached to `vcn_id`.
    ///
    /// Reuses an existing, not yet peered gateway on the VCN when there is
    /// one; otherwise creates a new one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the VCN doesn't exist or isn't visible
    /// - `ApiError` if creation is rejected (e.g. LPG limit reached)
    async fn create_or_get_local_peering_gateway(&self, vcn_id: &Ocid) -> Result<Ocid, CloudError>;

    /// Connect the requestor gateway to the acceptor gateway.
    ///
    /// Must be issued with the requestor's credentials.
    async fn connect_peering_gateways(
        &self,
        requestor_lpg: &Ocid,
        acceptor_lpg: &Ocid,
    ) -> Result<(), CloudError>;

    /// Authorize the requestor side of a cross-tenancy peering.
    ///
    /// Issued with the requestor's credentials; lets `requestor_group`
    /// connect `requestor_lpg` to gateways in `acceptor_tenancy`.
    async fn request_cross_tenancy_peering(
        &self,
        requestor_lpg: &Ocid,
        requestor_group: &Ocid,
        acceptor_tenancy: &Ocid,
    ) -> Result<(), CloudError>;

    /// Accept a cross-tenancy peering on the acceptor side.
    ///
    /// Issued with the acceptor's credentials; admits `requestor_group` of
    /// `requestor_tenancy` to connect to `acceptor_lpg`.
    async fn accept_cross_tenancy_peering(
        &self,
        acceptor_lpg: &Ocid,
        requestor_group: &Ocid,
        requestor_tenancy: &Ocid,
    ) -> Result<(), CloudError>;

    /// Append a rule sending `destination` traffic to `target_lpg`.
    ///
    /// Existing rules in the table are preserved.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the route table (or VCN, for `VcnDefault`) doesn't exist
    /// - `Conflict` if the table changed between read and write
    /// - `ApiError` if the rule is rejected (e.g. overlapping destination)
    async fn add_route_rule(
        &self,
        route_table: &RouteTableRef,
        destination: &Cidr,
        target_lpg: &Ocid,
    ) -> Result<(), CloudError>;

    /// List VCNs visible to the credentials.
    async fn list_vcns(&self) -> Result<Vec<VcnSummary>, CloudError>;

    /// List IAM groups in the credentials' tenancy.
    async fn list_groups(&self) -> Result<Vec<GroupSummary>, CloudError>;

    /// List route tables, optionally only those of one VCN.
    async fn list_route_tables(
        &self,
        vcn_id: Option<&Ocid>,
    ) -> Result<Vec<RouteTableSummary>, CloudError>;
}
