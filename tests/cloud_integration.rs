//! Integration tests for the peering and listing workflows.
//!
//! These tests drive the engine against MockCloud and check the gateway
//! calls it makes. Live OCI API tests are behind the `live_oci_tests`
//! feature flag.

use clap::Parser;
use peer_oracle_vcn::cli::Cli;
use peer_oracle_vcn::cloud::mock::{FailOn, MockCloud, MockLpg, MockOperation};
use peer_oracle_vcn::cloud::{
    CloudError, CloudGateway, GroupSummary, RouteTableRef, RouteTableSummary, VcnSummary,
};
use peer_oracle_vcn::core::command::{Command, PeeringTargets};
use peer_oracle_vcn::core::types::Ocid;
use peer_oracle_vcn::engine::listing;
use peer_oracle_vcn::engine::{
    create_lpg_inter_tenant, create_lpg_intra_tenant, EngineError, PeeringStep,
};

fn ocid(s: &str) -> Ocid {
    Ocid::new(s).unwrap()
}

fn acme() -> Ocid {
    ocid("ocid1.tenancy.oc1..acme")
}

fn globex() -> Ocid {
    ocid("ocid1.tenancy.oc1..globex")
}

fn vcn_a() -> Ocid {
    ocid("ocid1.vcn.oc1.iad.aaaa")
}

fn vcn_b() -> Ocid {
    ocid("ocid1.vcn.oc1.iad.bbbb")
}

fn group() -> Ocid {
    ocid("ocid1.group.oc1..peering")
}

fn two_vcn_tenancy() -> MockCloud {
    MockCloud::new(acme())
        .with_vcn(MockCloud::vcn(&vcn_a(), "a", "10.0.0.0/24"))
        .with_vcn(MockCloud::vcn(&vcn_b(), "b", "10.1.0.0/24"))
}

fn targets() -> PeeringTargets {
    PeeringTargets::builder()
        .requestor_vcn(vcn_a().as_str())
        .acceptor_vcn(vcn_b().as_str())
        .requestor_cidr("10.0.0.0/24")
        .acceptor_cidr("10.1.0.0/24")
        .build()
        .unwrap()
}

/// Requestor in ACME with VCN A, acceptor in GLOBEX with VCN B, sharing a journal.
fn two_tenancies() -> (MockCloud, MockCloud) {
    let requestor = MockCloud::new(acme())
        .with_vcn(MockCloud::vcn(&vcn_a(), "a", "10.0.0.0/24"))
        .with_group(GroupSummary {
            id: group(),
            name: "peering".into(),
            lifecycle_state: "ACTIVE".into(),
            description: None,
        });
    let acceptor = requestor
        .linked(globex())
        .with_vcn(MockCloud::vcn(&vcn_b(), "b", "10.1.0.0/24"));
    (requestor, acceptor)
}

fn inter_targets() -> PeeringTargets {
    PeeringTargets::builder()
        .requestor_vcn(vcn_a().as_str())
        .acceptor_vcn(vcn_b().as_str())
        .requestor_group(group().as_str())
        .requestor_cidr("10.0.0.0/24")
        .acceptor_cidr("10.1.0.0/24")
        .build()
        .unwrap()
}

fn position(ops: &[MockOperation], pred: impl Fn(&MockOperation) -> bool) -> Vec<usize> {
    ops.iter()
        .enumerate()
        .filter(|(_, op)| pred(op))
        .map(|(i, _)| i)
        .collect()
}

// =============================================================================
// Intra-tenant peering
// =============================================================================

mod intra_tenant_tests {
    use super::*;

    #[tokio::test]
    async fn end_to_end_from_command_line() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("config");
        std::fs::write(&config, "[DEFAULT]\n").unwrap();

        let cli = Cli::try_parse_from([
            "peer-oracle-vcn",
            "intra_tenant",
            "--api-config-file",
            config.to_str().unwrap(),
            "--requestor-vcn-ocid",
            vcn_a().as_str(),
            "--acceptor-vcn-ocid",
            vcn_b().as_str(),
            "--requestor-cidr",
            "10.0.0.0/24",
            "--acceptor-cidr",
            "10.1.0.0/24",
        ])
        .unwrap();
        let Command::PeerWithinTenant { targets, .. } = cli.command.into_command().unwrap() else {
            panic!("expected intra_tenant command");
        };

        let cloud = two_vcn_tenancy();
        let report = create_lpg_intra_tenant(&cloud, &targets).await.unwrap();

        let default_a = MockCloud::vcn(&vcn_a(), "a", "10.0.0.0/24")
            .default_route_table_id
            .unwrap();
        let default_b = MockCloud::vcn(&vcn_b(), "b", "10.1.0.0/24")
            .default_route_table_id
            .unwrap();

        assert_eq!(
            cloud.operations(),
            vec![
                MockOperation::ListVcns,
                MockOperation::CreateOrGetLpg { vcn: vcn_a() },
                MockOperation::CreateOrGetLpg { vcn: vcn_b() },
                MockOperation::Connect {
                    requestor_lpg: report.requestor_lpg.clone(),
                    acceptor_lpg: report.acceptor_lpg.clone(),
                },
                MockOperation::AddRouteRule {
                    route_table: RouteTableRef::VcnDefault(vcn_a()),
                    destination: "10.1.0.0/24".parse().unwrap(),
                    target_lpg: report.requestor_lpg.clone(),
                },
                MockOperation::AddRouteRule {
                    route_table: RouteTableRef::VcnDefault(vcn_b()),
                    destination: "10.0.0.0/24".parse().unwrap(),
                    target_lpg: report.acceptor_lpg.clone(),
                },
            ]
        );
        assert_eq!(cloud.route_rules(&default_a).len(), 1);
        assert_eq!(cloud.route_rules(&default_b).len(), 1);
    }

    #[tokio::test]
    async fn fail_fast_at_every_step() {
        let expected = [
            PeeringStep::ResolveVcns,
            PeeringStep::CreateRequestorGateway,
            PeeringStep::CreateAcceptorGateway,
            PeeringStep::ConnectGateways,
            PeeringStep::AddRequestorRoute,
            PeeringStep::AddAcceptorRoute,
        ];

        for (k, step) in expected.iter().enumerate() {
            let n = k + 1;
            let cloud = two_vcn_tenancy().fail_on(FailOn::NthCall(n, CloudError::RateLimited));

            let err = create_lpg_intra_tenant(&cloud, &targets()).await.unwrap_err();

            assert_eq!(err.step(), Some(*step), "failing call {n}");
            assert_eq!(cloud.operations().len(), n, "calls after failing call {n}");
        }
    }

    #[tokio::test]
    async fn explicit_route_tables_are_used() {
        let rt = ocid("ocid1.routetable.oc1.iad.custom");
        let cloud = two_vcn_tenancy().with_route_table(RouteTableSummary {
            id: rt.clone(),
            display_name: "custom".into(),
            lifecycle_state: "AVAILABLE".into(),
            vcn_id: vcn_a(),
            rule_count: 0,
        });
        let mut t = targets();
        t.requestor_route_table = Some(rt.clone());

        create_lpg_intra_tenant(&cloud, &t).await.unwrap();

        let rules = cloud.route_rules(&rt);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].destination.to_string(), "10.1.0.0/24");
    }

    #[tokio::test]
    async fn resolves_missing_acceptor_vcn() {
        let cloud = two_vcn_tenancy();
        let mut t = targets();
        t.acceptor_vcn = None;

        let report = create_lpg_intra_tenant(&cloud, &t).await.unwrap();
        assert_eq!(report.request.acceptor_vcn, vcn_b());
        assert_eq!(cloud.operations().len(), 6);
    }

    #[tokio::test]
    async fn resolves_both_vcns_without_ids() {
        let cloud = two_vcn_tenancy().with_vcn(VcnSummary {
            lifecycle_state: "TERMINATED".into(),
            ..MockCloud::vcn(&ocid("ocid1.vcn.oc1.iad.dead"), "old", "10.1.0.0/24")
        });
        let t = PeeringTargets::builder()
            .requestor_cidr("10.0.0.0/24")
            .acceptor_cidr("10.1.0.0/24")
            .build()
            .unwrap();

        let report = create_lpg_intra_tenant(&cloud, &t).await.unwrap();
        assert_eq!(report.request.requestor_vcn, vcn_a());
        assert_eq!(report.request.acceptor_vcn, vcn_b());
        assert_eq!(cloud.operations().len(), 6);
    }

    #[tokio::test]
    async fn ambiguous_vcns_fail_before_mutation() {
        let cloud = two_vcn_tenancy().with_vcn(MockCloud::vcn(
            &ocid("ocid1.vcn.oc1.iad.cccc"),
            "c",
            "10.1.0.0/16",
        ));
        let mut t = targets();
        t.acceptor_vcn = None;

        let err = create_lpg_intra_tenant(&cloud, &t).await.unwrap_err();
        assert!(matches!(err, EngineError::Resolve(_)));
        assert_eq!(cloud.operations(), vec![MockOperation::ListVcns]);
    }

    #[tokio::test]
    async fn reuses_unpeered_gateway() {
        let existing = ocid("ocid1.localpeeringgateway.oc1.iad.existing");
        let cloud = two_vcn_tenancy().with_lpg(MockLpg {
            id: existing.clone(),
            vcn_id: vcn_a(),
            peer_id: None,
        });

        let report = create_lpg_intra_tenant(&cloud, &targets()).await.unwrap();
        assert_eq!(report.requestor_lpg, existing);
    }

    #[tokio::test]
    async fn rerun_does_not_reuse_peered_gateways() {
        let cloud = two_vcn_tenancy();
        let first = create_lpg_intra_tenant(&cloud, &targets()).await.unwrap();
        let second = create_lpg_intra_tenant(&cloud, &targets()).await.unwrap();

        assert_ne!(first.requestor_lpg, second.requestor_lpg);
        assert_ne!(first.acceptor_lpg, second.acceptor_lpg);
        assert_eq!(cloud.local_peering_gateways().len(), 4);
    }
}

// =============================================================================
// Inter-tenant peering
// =============================================================================

mod inter_tenant_tests {
    use super::*;

    #[tokio::test]
    async fn call_order_across_tenancies() {
        let (requestor, acceptor) = two_tenancies();

        create_lpg_inter_tenant(&requestor, &acceptor, &inter_targets())
            .await
            .unwrap();

        let calls: Vec<(String, &'static str)> = requestor
            .calls()
            .into_iter()
            .map(|c| (c.tenancy.to_string(), c.operation.name()))
            .collect();
        let acme = acme().to_string();
        let globex = globex().to_string();
        assert_eq!(
            calls,
            vec![
                (acme.clone(), "list_vcns"),
                (globex.clone(), "list_vcns"),
                (acme.clone(), "create_or_get_local_peering_gateway"),
                (globex.clone(), "create_or_get_local_peering_gateway"),
                (acme.clone(), "request_cross_tenancy_peering"),
                (globex.clone(), "accept_cross_tenancy_peering"),
                (acme.clone(), "connect_peering_gateways"),
                (acme.clone(), "add_route_rule"),
                (globex.clone(), "add_route_rule"),
            ]
        );
    }

    #[tokio::test]
    async fn each_side_uses_its_own_gateway() {
        let (requestor, acceptor) = two_tenancies();

        let report = create_lpg_inter_tenant(&requestor, &acceptor, &inter_targets())
            .await
            .unwrap();
        let requestor_lpg = report.requestor_lpg.clone();
        let acceptor_lpg = report.acceptor_lpg.clone();
        assert_ne!(requestor_lpg, acceptor_lpg);

        let mutations: Vec<MockOperation> = requestor
            .operations()
            .into_iter()
            .filter(|op| {
                !matches!(
                    op,
                    MockOperation::ListVcns
                        | MockOperation::ListGroups
                        | MockOperation::CreateOrGetLpg { .. }
                )
            })
            .collect();
        assert_eq!(
            mutations,
            vec![
                MockOperation::RequestCrossTenancy {
                    requestor_lpg: requestor_lpg.clone(),
                    requestor_group: group(),
                    acceptor_tenancy: globex(),
                },
                MockOperation::AcceptCrossTenancy {
                    acceptor_lpg: acceptor_lpg.clone(),
                    requestor_group: group(),
                    requestor_tenancy: acme(),
                },
                MockOperation::Connect {
                    requestor_lpg: requestor_lpg.clone(),
                    acceptor_lpg: acceptor_lpg.clone(),
                },
                MockOperation::AddRouteRule {
                    route_table: RouteTableRef::VcnDefault(vcn_a()),
                    destination: "10.1.0.0/24".parse().unwrap(),
                    target_lpg: requestor_lpg.clone(),
                },
                MockOperation::AddRouteRule {
                    route_table: RouteTableRef::VcnDefault(vcn_b()),
                    destination: "10.0.0.0/24".parse().unwrap(),
                    target_lpg: acceptor_lpg.clone(),
                },
            ]
        );

        let requestor_gateways = requestor.local_peering_gateways();
        let acceptor_gateways = acceptor.local_peering_gateways();
        assert_eq!(requestor_gateways[0].id, requestor_lpg);
        assert_eq!(requestor_gateways[0].vcn_id, vcn_a());
        assert_eq!(acceptor_gateways[0].id, acceptor_lpg);
        assert_eq!(acceptor_gateways[0].vcn_id, vcn_b());
    }

    #[tokio::test]
    async fn accept_names_requestor_tenancy_and_group() {
        let (requestor, acceptor) = two_tenancies();

        let report = create_lpg_inter_tenant(&requestor, &acceptor, &inter_targets())
            .await
            .unwrap();

        let ops = acceptor.operations();
        let accepts: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, MockOperation::AcceptCrossTenancy { .. }))
            .collect();
        assert_eq!(
            accepts,
            vec![&MockOperation::AcceptCrossTenancy {
                acceptor_lpg: report.acceptor_lpg.clone(),
                requestor_group: group(),
                requestor_tenancy: acme(),
            }]
        );
    }

    #[tokio::test]
    async fn connect_after_creates_and_before_routes() {
        let (requestor, acceptor) = two_tenancies();
        create_lpg_inter_tenant(&requestor, &acceptor, &inter_targets())
            .await
            .unwrap();

        let ops = requestor.operations();
        let creates = position(&ops, |op| matches!(op, MockOperation::CreateOrGetLpg { .. }));
        let connects = position(&ops, |op| matches!(op, MockOperation::Connect { .. }));
        let routes = position(&ops, |op| matches!(op, MockOperation::AddRouteRule { .. }));
        let accepts = position(&ops, |op| matches!(op, MockOperation::AcceptCrossTenancy { .. }));

        assert_eq!(connects.len(), 1);
        assert_eq!(accepts.len(), 1);
        assert!(creates.iter().all(|&c| c < connects[0]));
        assert!(routes.iter().all(|&r| r > connects[0]));
        assert!(accepts[0] < connects[0]);
    }

    #[tokio::test]
    async fn identical_profiles_still_run() {
        let cloud = two_vcn_tenancy();
        let same = cloud.clone();

        create_lpg_inter_tenant(&cloud, &same, &inter_targets())
            .await
            .unwrap();

        let accepts = cloud
            .operations()
            .into_iter()
            .filter(|op| matches!(op, MockOperation::AcceptCrossTenancy { .. }))
            .count();
        assert_eq!(accepts, 1);
    }

    #[tokio::test]
    async fn fail_fast_at_every_step() {
        let cases: Vec<(bool, FailOn, PeeringStep, usize)> = vec![
            (
                true,
                FailOn::CreateOrGetLpg(CloudError::RateLimited),
                PeeringStep::CreateRequestorGateway,
                3,
            ),
            (
                false,
                FailOn::CreateOrGetLpg(CloudError::RateLimited),
                PeeringStep::CreateAcceptorGateway,
                4,
            ),
            (
                true,
                FailOn::RequestCrossTenancy(CloudError::RateLimited),
                PeeringStep::RequestCrossTenancy,
                5,
            ),
            (
                false,
                FailOn::AcceptCrossTenancy(CloudError::RateLimited),
                PeeringStep::AcceptCrossTenancy,
                6,
            ),
            (
                true,
                FailOn::Connect(CloudError::RateLimited),
                PeeringStep::ConnectGateways,
                7,
            ),
            (
                true,
                FailOn::AddRouteRule(CloudError::RateLimited),
                PeeringStep::AddRequestorRoute,
                8,
            ),
            (
                false,
                FailOn::AddRouteRule(CloudError::RateLimited),
                PeeringStep::AddAcceptorRoute,
                9,
            ),
        ];

        for (on_requestor, fail, step, calls) in cases {
            let (requestor, acceptor) = two_tenancies();
            let (requestor, acceptor) = if on_requestor {
                (requestor.fail_on(fail), acceptor)
            } else {
                (requestor, acceptor.fail_on(fail))
            };

            let err = create_lpg_inter_tenant(&requestor, &acceptor, &inter_targets())
                .await
                .unwrap_err();

            assert_eq!(err.step(), Some(step));
            assert_eq!(requestor.operations().len(), calls, "calls for {step}");
        }
    }

    #[tokio::test]
    async fn missing_group_is_listed_on_requestor() {
        let (requestor, acceptor) = two_tenancies();
        let mut t = inter_targets();
        t.requestor_group = None;

        create_lpg_inter_tenant(&requestor, &acceptor, &t)
            .await
            .unwrap();

        let calls = requestor.calls();
        let groups: Vec<_> = calls
            .iter()
            .filter(|c| c.operation == MockOperation::ListGroups)
            .collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tenancy, acme());
    }

    #[tokio::test]
    async fn acceptor_vcn_must_be_visible_to_acceptor() {
        let (requestor, acceptor) = two_tenancies();
        let mut t = inter_targets();
        t.acceptor_vcn = Some(vcn_a());

        let err = create_lpg_inter_tenant(&requestor, &acceptor, &t)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Resolve(_)));
        assert!(!requestor
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::CreateOrGetLpg { .. })));
    }
}

// =============================================================================
// Listing
// =============================================================================

mod listing_tests {
    use super::*;

    fn vcn_without_default(id: &Ocid, name: &str) -> VcnSummary {
        VcnSummary {
            default_route_table_id: None,
            ..MockCloud::vcn(id, name, "10.0.0.0/16")
        }
    }

    fn table(id: &str, vcn: &Ocid) -> RouteTableSummary {
        RouteTableSummary {
            id: ocid(id),
            display_name: id.rsplit('.').next().unwrap_or(id).to_string(),
            lifecycle_state: "AVAILABLE".into(),
            vcn_id: vcn.clone(),
            rule_count: 0,
        }
    }

    fn scenario() -> MockCloud {
        let v1 = ocid("ocid1.vcn.oc1.iad.v1");
        let v2 = ocid("ocid1.vcn.oc1.iad.v2");
        MockCloud::new(acme())
            .with_vcn(vcn_without_default(&v1, "v1"))
            .with_vcn(vcn_without_default(&v2, "v2"))
            .with_route_table(table("ocid1.routetable.oc1.iad.t1", &v1))
            .with_route_table(table("ocid1.routetable.oc1.iad.t3", &v2))
            .with_route_table(table("ocid1.routetable.oc1.iad.t2", &v1))
    }

    fn names(tables: &[RouteTableSummary]) -> Vec<String> {
        tables.iter().map(|t| t.display_name.clone()).collect()
    }

    #[tokio::test]
    async fn route_tables_union_without_filter() {
        let cloud = scenario();
        let tables = listing::list_route_tables(&cloud, None).await.unwrap();
        assert_eq!(names(&tables), vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn route_tables_with_filter() {
        let cloud = scenario();
        let v1 = ocid("ocid1.vcn.oc1.iad.v1");
        let tables = listing::list_route_tables(&cloud, Some(&v1)).await.unwrap();
        assert_eq!(names(&tables), vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn list_vcns_and_groups() {
        let (requestor, _) = two_tenancies();
        assert_eq!(listing::list_vcns(&requestor).await.unwrap().len(), 1);
        assert_eq!(listing::list_groups(&requestor).await.unwrap()[0].id, group());
        assert_eq!(requestor.tenancy_id(), &acme());
    }
}

// =============================================================================
// Live OCI tests
// =============================================================================

#[cfg(feature = "live_oci_tests")]
mod live_tests {
    use super::*;
    use peer_oracle_vcn::cloud::create_gateway;
    use peer_oracle_vcn::core::command::Credentials;
    use peer_oracle_vcn::core::paths::{default_config_file, DEFAULT_PROFILE};

    fn credentials() -> Credentials {
        let config = std::env::var("PEER_ORACLE_VCN_TEST_CONFIG")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| default_config_file());
        let profile = std::env::var("PEER_ORACLE_VCN_TEST_PROFILE")
            .unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
        Credentials::new(config, profile)
    }

    #[tokio::test]
    async fn live_list_vcns() {
        let Ok(gateway) = create_gateway(&credentials()) else {
            eprintln!("Skipping live test: no usable OCI profile");
            return;
        };
        let vcns = gateway.list_vcns().await.unwrap();
        for vcn in &vcns {
            assert_eq!(vcn.id.resource_type(), Some("vcn"));
        }
    }

    #[tokio::test]
    async fn live_list_route_tables_of_unknown_vcn() {
        let Ok(gateway) = create_gateway(&credentials()) else {
            eprintln!("Skipping live test: no usable OCI profile");
            return;
        };
        let result = gateway
            .list_route_tables(Some(&ocid("ocid1.vcn.oc1.iad.doesnotexist")))
            .await;
        assert!(matches!(
            result,
            Err(CloudError::NotFound(_)) | Err(CloudError::AuthFailed(_))
        ));
    }
}
