//! cloud::mock
//!
//! Mock gateway implementation for deterministic testing.
//!
//! # Design
//!
//! The mock gateway provides a deterministic implementation of the
//! `CloudGateway` trait. It keeps VCNs, groups, route tables and local
//! peering gateways in memory, records every call, and can be configured
//! to fail.
//!
//! Two mocks can share one call journal via [`MockCloud::linked`], which is
//! how inter-tenant tests observe the ordering of calls made with the
//! requestor's and the acceptor's credentials.
//!
//! # Example
//!
//! ```
//! use peer_oracle_vcn::cloud::mock::{MockCloud, MockOperation};
//! use peer_oracle_vcn::cloud::CloudGateway;
//! use peer_oracle_vcn::core::types::Ocid;
//!
//! # tokio_test::block_on(async {
//! let tenancy = Ocid::new("ocid1.tenancy.oc1..acme").unwrap();
//! let vcn = Ocid::new("ocid1.vcn.oc1.iad.one").unwrap();
//! let cloud = MockCloud::new(tenancy).with_vcn(MockCloud::vcn(&vcn, "one", "10.0.0.0/16"));
//!
//! let lpg = cloud.create_or_get_local_peering_gateway(&vcn).await.unwrap();
//! assert_eq!(lpg.resource_type(), Some("localpeeringgateway"));
//! assert!(matches!(cloud.operations()[0], MockOperation::CreateOrGetLpg { .. }));
//! # });
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{
    CloudError, CloudGateway, GroupSummary, RouteTableRef, RouteTableSummary, VcnSummary,
};
use crate::core::types::{Cidr, Ocid};

/// Mock gateway for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockCloud {
    tenancy: Ocid,
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockCloudInner>>,
    /// Call journal, possibly shared with linked mocks.
    journal: Arc<Mutex<Vec<RecordedCall>>>,
    /// Id counter for created resources, shared with linked mocks.
    next_id: Arc<AtomicU64>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockCloudInner {
    vcns: Vec<VcnSummary>,
    groups: Vec<GroupSummary>,
    route_tables: Vec<MockRouteTable>,
    lpgs: Vec<MockLpg>,
    /// Number of calls received by this mock.
    calls: usize,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
}

#[derive(Debug, Clone)]
struct MockRouteTable {
    summary: RouteTableSummary,
    rules: Vec<MockRouteRule>,
}

/// A route rule stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRouteRule {
    pub destination: Cidr,
    pub target: Ocid,
}

/// A local peering gateway stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockLpg {
    pub id: Ocid,
    pub vcn_id: Ocid,
    pub peer_id: Option<Ocid>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every create_or_get_local_peering_gateway call.
    CreateOrGetLpg(CloudError),
    /// Fail create_or_get_local_peering_gateway for one VCN only.
    CreateOrGetLpgFor(Ocid, CloudError),
    /// Fail connect_peering_gateways.
    Connect(CloudError),
    /// Fail request_cross_tenancy_peering.
    RequestCrossTenancy(CloudError),
    /// Fail accept_cross_tenancy_peering.
    AcceptCrossTenancy(CloudError),
    /// Fail every add_route_rule call.
    AddRouteRule(CloudError),
    /// Fail list_vcns.
    ListVcns(CloudError),
    /// Fail list_groups.
    ListGroups(CloudError),
    /// Fail list_route_tables.
    ListRouteTables(CloudError),
    /// Fail the n-th call (1-based) made to this mock, whatever it is.
    NthCall(usize, CloudError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreateOrGetLpg {
        vcn: Ocid,
    },
    Connect {
        requestor_lpg: Ocid,
        acceptor_lpg: Ocid,
    },
    RequestCrossTenancy {
        requestor_lpg: Ocid,
        requestor_group: Ocid,
        acceptor_tenancy: Ocid,
    },
    AcceptCrossTenancy {
        acceptor_lpg: Ocid,
        requestor_group: Ocid,
        requestor_tenancy: Ocid,
    },
    AddRouteRule {
        route_table: RouteTableRef,
        destination: Cidr,
        target_lpg: Ocid,
    },
    ListVcns,
    ListGroups,
    ListRouteTables {
        vcn: Option<Ocid>,
    },
}

impl MockOperation {
    /// Short operation name, matching the trait method.
    pub fn name(&self) -> &'static str {
        match self {
            MockOperation::CreateOrGetLpg { .. } => "create_or_get_local_peering_gateway",
            MockOperation::Connect { .. } => "connect_peering_gateways",
            MockOperation::RequestCrossTenancy { .. } => "request_cross_tenancy_peering",
            MockOperation::AcceptCrossTenancy { .. } => "accept_cross_tenancy_peering",
            MockOperation::AddRouteRule { .. } => "add_route_rule",
            MockOperation::ListVcns => "list_vcns",
            MockOperation::ListGroups => "list_groups",
            MockOperation::ListRouteTables { .. } => "list_route_tables",
        }
    }
}

/// An operation plus the tenancy whose credentials issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub tenancy: Ocid,
    pub operation: MockOperation,
}

impl MockCloud {
    /// Create a new empty mock for `tenancy`.
    pub fn new(tenancy: Ocid) -> Self {
        Self {
            tenancy,
            inner: Arc::new(Mutex::new(MockCloudInner::default())),
            journal: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create an empty mock for another tenancy that shares this mock's
    /// call journal and id counter.
    pub fn linked(&self, tenancy: Ocid) -> Self {
        Self {
            tenancy,
            inner: Arc::new(Mutex::new(MockCloudInner::default())),
            journal: Arc::clone(&self.journal),
            next_id: Arc::clone(&self.next_id),
        }
    }

    /// Build a VCN summary with a default route table derived from its id.
    ///
    /// The compartment is a fixed mock compartment.
    pub fn vcn(id: &Ocid, name: &str, cidr: &str) -> VcnSummary {
        VcnSummary {
            id: id.clone(),
            display_name: name.to_string(),
            lifecycle_state: "AVAILABLE".to_string(),
            compartment_id: mock_ocid("compartment", "root"),
            cidr_blocks: vec![cidr.to_string()],
            default_route_table_id: Some(mock_ocid("routetable", &format!("default-{}", id.short(12)))),
        }
    }

    /// Add a VCN. Its default route table, if any, is registered too.
    pub fn with_vcn(self, vcn: VcnSummary) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(rt) = &vcn.default_route_table_id {
                inner.route_tables.push(MockRouteTable {
                    summary: RouteTableSummary {
                        id: rt.clone(),
                        display_name: format!("Default Route Table for {}", vcn.display_name),
                        lifecycle_state: "AVAILABLE".to_string(),
                        vcn_id: vcn.id.clone(),
                        rule_count: 0,
                    },
                    rules: Vec::new(),
                });
            }
            inner.vcns.push(vcn);
        }
        self
    }

    /// Add a route table.
    pub fn with_route_table(self, table: RouteTableSummary) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.route_tables.push(MockRouteTable {
                summary: table,
                rules: Vec::new(),
            });
        }
        self
    }

    /// Add an IAM group.
    pub fn with_group(self, group: GroupSummary) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.groups.push(group);
        }
        self
    }

    /// Add an existing local peering gateway.
    pub fn with_lpg(self, lpg: MockLpg) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.lpgs.push(lpg);
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use peer_oracle_vcn::cloud::mock::{FailOn, MockCloud};
    /// use peer_oracle_vcn::cloud::CloudError;
    /// use peer_oracle_vcn::core::types::Ocid;
    ///
    /// let tenancy = Ocid::new("ocid1.tenancy.oc1..acme").unwrap();
    /// let cloud = MockCloud::new(tenancy).fail_on(FailOn::Connect(CloudError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// All operations in the shared journal, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        let journal = self.journal.lock().unwrap();
        journal.iter().map(|c| c.operation.clone()).collect()
    }

    /// All calls in the shared journal with the issuing tenancy.
    pub fn calls(&self) -> Vec<RecordedCall> {
        let journal = self.journal.lock().unwrap();
        journal.clone()
    }

    /// Clear the shared journal.
    pub fn clear_operations(&self) {
        let mut journal = self.journal.lock().unwrap();
        journal.clear();
    }

    /// Local peering gateways known to this mock.
    pub fn local_peering_gateways(&self) -> Vec<MockLpg> {
        let inner = self.inner.lock().unwrap();
        inner.lpgs.clone()
    }

    /// Rules of a route table (for test verification).
    pub fn route_rules(&self, table_id: &Ocid) -> Vec<MockRouteRule> {
        let inner = self.inner.lock().unwrap();
        inner
            .route_tables
            .iter()
            .find(|t| &t.summary.id == table_id)
            .map(|t| t.rules.clone())
            .unwrap_or_default()
    }

    /// Record an operation and bump this mock's call counter.
    fn record(&self, op: MockOperation) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.calls += 1;
        }
        let mut journal = self.journal.lock().unwrap();
        journal.push(RecordedCall {
            tenancy: self.tenancy.clone(),
            operation: op,
        });
    }

    /// Check if we should fail and return the error if so.
    fn check_fail<T>(&self, op: &MockOperation) -> Option<Result<T, CloudError>> {
        let inner = self.inner.lock().unwrap();
        let err = match (&inner.fail_on, op) {
            (Some(FailOn::NthCall(n, e)), _) if *n == inner.calls => e,
            (Some(FailOn::CreateOrGetLpg(e)), MockOperation::CreateOrGetLpg { .. }) => e,
            (Some(FailOn::CreateOrGetLpgFor(vcn, e)), MockOperation::CreateOrGetLpg { vcn: v })
                if vcn == v =>
            {
                e
            }
            (Some(FailOn::Connect(e)), MockOperation::Connect { .. }) => e,
            (Some(FailOn::RequestCrossTenancy(e)), MockOperation::RequestCrossTenancy { .. }) => e,
            (Some(FailOn::AcceptCrossTenancy(e)), MockOperation::AcceptCrossTenancy { .. }) => e,
            (Some(FailOn::AddRouteRule(e)), MockOperation::AddRouteRule { .. }) => e,
            (Some(FailOn::ListVcns(e)), MockOperation::ListVcns) => e,
            (Some(FailOn::ListGroups(e)), MockOperation::ListGroups) => e,
            (Some(FailOn::ListRouteTables(e)), MockOperation::ListRouteTables { .. }) => e,
            _ => return None,
        };
        Some(Err(err.clone()))
    }

    /// Record, then fail if configured to.
    fn enter<T>(&self, op: MockOperation) -> Option<Result<T, CloudError>> {
        self.record(op.clone());
        self.check_fail(&op)
    }
}

fn mock_ocid(kind: &str, unique: &str) -> Ocid {
    // Built from fixed components, always a valid OCID
    Ocid::new(format!("ocid1.{kind}.oc1.mock.{unique}"))
        .unwrap_or_else(|_| unreachable!("mock OCID components are valid"))
}

#[async_trait]
impl CloudGateway for MockCloud {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn tenancy_id(&self) -> &Ocid {
        &self.tenancy
    }

    async fn create_or_get_local_peering_gateway(&self, vcn_id: &Ocid) -> Result<Ocid, CloudError> {
        if let Some(result) = self.enter(MockOperation::CreateOrGetLpg {
            vcn: vcn_id.clone(),
        }) {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.vcns.iter().any(|v| &v.id == vcn_id) {
            return Err(CloudError::NotFound(format!("VCN {}", vcn_id)));
        }

        if let Some(existing) = inner
            .lpgs
            .iter()
            .find(|l| &l.vcn_id == vcn_id && l.peer_id.is_none())
        {
            return Ok(existing.id.clone());
        }

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = mock_ocid("localpeeringgateway", &format!("lpg{n}"));
        inner.lpgs.push(MockLpg {
            id: id.clone(),
            vcn_id: vcn_id.clone(),
            peer_id: None,
        });
        Ok(id)
    }

    async fn connect_peering_gateways(
        &self,
        requestor_lpg: &Ocid,
        acceptor_lpg: &Ocid,
    ) -> Result<(), CloudError> {
        if let Some(result) = self.enter(MockOperation::Connect {
            requestor_lpg: requestor_lpg.clone(),
            acceptor_lpg: acceptor_lpg.clone(),
        }) {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        let requestor = inner
            .lpgs
            .iter_mut()
            .find(|l| &l.id == requestor_lpg)
            .ok_or_else(|| CloudError::NotFound(format!("local peering gateway {}", requestor_lpg)))?;

        if requestor.peer_id.is_some() {
            return Err(CloudError::Conflict(format!(
                "local peering gateway {} is already peered",
                requestor_lpg
            )));
        }
        requestor.peer_id = Some(acceptor_lpg.clone());

        // The acceptor lives here for intra-tenant peering, in a linked mock otherwise
        if let Some(acceptor) = inner.lpgs.iter_mut().find(|l| &l.id == acceptor_lpg) {
            acceptor.peer_id = Some(requestor_lpg.clone());
        }
        Ok(())
    }

    async fn request_cross_tenancy_peering(
        &self,
        requestor_lpg: &Ocid,
        requestor_group: &Ocid,
        acceptor_tenancy: &Ocid,
    ) -> Result<(), CloudError> {
        if let Some(result) = self.enter(MockOperation::RequestCrossTenancy {
            requestor_lpg: requestor_lpg.clone(),
            requestor_group: requestor_group.clone(),
            acceptor_tenancy: acceptor_tenancy.clone(),
        }) {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        if !inner.lpgs.iter().any(|l| &l.id == requestor_lpg) {
            return Err(CloudError::NotFound(format!(
                "local peering gateway {}",
                requestor_lpg
            )));
        }
        Ok(())
    }

    async fn accept_cross_tenancy_peering(
        &self,
        acceptor_lpg: &Ocid,
        requestor_group: &Ocid,
        requestor_tenancy: &Ocid,
    ) -> Result<(), CloudError> {
        if let Some(result) = self.enter(MockOperation::AcceptCrossTenancy {
            acceptor_lpg: acceptor_lpg.clone(),
            requestor_group: requestor_group.clone(),
            requestor_tenancy: requestor_tenancy.clone(),
        }) {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        if !inner.lpgs.iter().any(|l| &l.id == acceptor_lpg) {
            return Err(CloudError::NotFound(format!(
                "local peering gateway {}",
                acceptor_lpg
            )));
        }
        Ok(())
    }

    async fn add_route_rule(
        &self,
        route_table: &RouteTableRef,
        destination: &Cidr,
        target_lpg: &Ocid,
    ) -> Result<(), CloudError> {
        if let Some(result) = self.enter(MockOperation::AddRouteRule {
            route_table: route_table.clone(),
            destination: *destination,
            target_lpg: target_lpg.clone(),
        }) {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        let table_id = match route_table {
            RouteTableRef::Table(id) => id.clone(),
            RouteTableRef::VcnDefault(vcn_id) => inner
                .vcns
                .iter()
                .find(|v| &v.id == vcn_id)
                .and_then(|v| v.default_route_table_id.clone())
                .ok_or_else(|| CloudError::NotFound(format!("VCN {}", vcn_id)))?,
        };

        let table = inner
            .route_tables
            .iter_mut()
            .find(|t| t.summary.id == table_id)
            .ok_or_else(|| CloudError::NotFound(format!("route table {}", table_id)))?;

        table.rules.push(MockRouteRule {
            destination: *destination,
            target: target_lpg.clone(),
        });
        table.summary.rule_count = table.rules.len();
        Ok(())
    }

    async fn list_vcns(&self) -> Result<Vec<VcnSummary>, CloudError> {
        if let Some(result) = self.enter(MockOperation::ListVcns) {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.vcns.clone())
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, CloudError> {
        if let Some(result) = self.enter(MockOperation::ListGroups) {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.clone())
    }

    async fn list_route_tables(
        &self,
        vcn_id: Option<&Ocid>,
    ) -> Result<Vec<RouteTableSummary>, CloudError> {
        if let Some(result) = self.enter(MockOperation::ListRouteTables {
            vcn: vcn_id.cloned(),
        }) {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        // Grouped by VCN in VCN listing order
        let tables = inner
            .vcns
            .iter()
            .filter(|v| vcn_id.map_or(true, |id| &v.id == id))
            .flat_map(|v| {
                inner
                    .route_tables
                    .iter()
                    .filter(move |t| t.summary.vcn_id == v.id)
                    .map(|t| t.summary.clone())
            })
            .collect();
        Ok(tables)
    }
}
