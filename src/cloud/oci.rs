//! cloud::oci
//!
//! OCI gateway implementation over the Core Services and Identity REST APIs.
//!
//! # Design
//!
//! This module implements the `CloudGateway` trait for Oracle Cloud. It uses:
//! - Core Services (`iaas.<region>`) for VCNs, route tables and local
//!   peering gateways
//! - Identity (`identity.<region>`) for compartments, groups and the IAM
//!   policies that authorize cross-tenancy peering
//!
//! Every request is signed by a [`RequestSigner`] and tagged with a fresh
//! `opc-request-id` so failures can be traced on the OCI side.
//!
//! # Visibility
//!
//! "Visible" resources are those in the tenancy's root compartment plus
//! every ACTIVE compartment beneath it. Listings walk the compartments in
//! that order and follow `opc-next-page` pagination.
//!
//! # Example
//!
//! ```ignore
//! use peer_oracle_vcn::cloud::oci::OciClient;
//! use peer_oracle_vcn::cloud::signer::RequestSigner;
//! use peer_oracle_vcn::cloud::CloudGateway;
//!
//! let signer = RequestSigner::from_profile(&profile)?;
//! let oci = OciClient::new(&profile, signer);
//! for vcn in oci.list_vcns().await? {
//!     println!("{} {}", vcn.id, vcn.display_name);
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ETAG, IF_MATCH, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::signer::RequestSigner;
use super::traits::{
    CloudError, CloudGateway, GroupSummary, RouteTableRef, RouteTableSummary, VcnSummary,
};
use crate::core::config::OciProfile;
use crate::core::types::{Cidr, Ocid};

/// API version path segment shared by Core Services and Identity.
const API_VERSION: &str = "20160918";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "peer-oracle-vcn";

/// How many times a freshly created gateway is polled before giving up.
const LPG_POLL_ATTEMPTS: u32 = 30;

/// Delay between polls of a provisioning gateway.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Characters of the VCN id used in generated gateway names.
const NAME_SUFFIX_LEN: usize = 12;

/// OCI gateway implementation.
pub struct OciClient {
    /// HTTP client for making requests
    client: Client,
    /// Signs every request with the profile's API key
    signer: RequestSigner,
    /// Tenancy of the credentials (root compartment)
    tenancy: Ocid,
    /// Core Services base URL, including the API version
    core_base: String,
    /// Identity base URL, including the API version
    identity_base: String,
    /// Delay between provisioning polls
    poll_interval: Duration,
}

impl std::fmt::Debug for OciClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciClient")
            .field("key_id", &self.signer.key_id())
            .field("tenancy", &self.tenancy)
            .field("core_base", &self.core_base)
            .field("identity_base", &self.identity_base)
            .finish()
    }
}

impl OciClient {
    /// Create a client for the profile's region.
    pub fn new(profile: &OciProfile, signer: RequestSigner) -> Self {
        Self::with_endpoints(
            profile.tenancy.clone(),
            signer,
            format!("https://iaas.{}.oraclecloud.com/{}", profile.region, API_VERSION),
            format!(
                "https://identity.{}.oraclecloud.com/{}",
                profile.region, API_VERSION
            ),
        )
    }

    /// Create a client against explicit base URLs.
    ///
    /// Both bases must include the API version segment, e.g.
    /// `http://127.0.0.1:8080/20160918`.
    pub fn with_endpoints(
        tenancy: Ocid,
        signer: RequestSigner,
        core_base: impl Into<String>,
        identity_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            signer,
            tenancy,
            core_base: core_base.into().trim_end_matches('/').to_string(),
            identity_base: identity_base.into().trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the delay between provisioning polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn core_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CloudError> {
        build_url(&self.core_base, path, query)
    }

    fn identity_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CloudError> {
        build_url(&self.identity_base, path, query)
    }

    /// Sign and send a request, mapping non-2xx responses to errors.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        extra: HeaderMap,
    ) -> Result<Response, CloudError> {
        let mut headers = self.signer.sign(&method, &url, body.as_deref())?;
        let request_id = uuid::Uuid::new_v4().to_string();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "opc-request-id",
            HeaderValue::from_str(&request_id).map_err(|e| CloudError::Signing(e.to_string()))?,
        );
        headers.extend(extra);

        tracing::debug!(%method, %url, %request_id, "OCI request");

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), %request_id, "OCI response");

        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, CloudError> {
        let response = self.send(Method::GET, url, None, HeaderMap::new()).await?;
        read_json(response).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        extra: HeaderMap,
    ) -> Result<Response, CloudError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| CloudError::Signing(format!("cannot encode request body: {e}")))?;
        self.send(method, url, Some(bytes), extra).await
    }

    /// Fetch every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, CloudError> {
        let mut items = Vec::new();
        let mut page: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            if let Some(token) = &page {
                page_url.query_pairs_mut().append_pair("page", token);
            }

            let response = self
                .send(Method::GET, page_url, None, HeaderMap::new())
                .await?;
            let next = response
                .headers()
                .get("opc-next-page")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(String::from);

            let batch: Vec<T> = read_json(response).await?;
            items.extend(batch);

            match next {
                Some(token) => page = Some(token),
                None => break,
            }
        }

        Ok(items)
    }

    /// Root compartment followed by every ACTIVE compartment in its subtree.
    async fn visible_compartments(&self) -> Result<Vec<Ocid>, CloudError> {
        let url = self.identity_url(
            "/compartments",
            &[
                ("compartmentId", self.tenancy.as_str()),
                ("compartmentIdInSubtree", "true"),
                ("accessLevel", "ACCESSIBLE"),
            ],
        )?;
        let listed: Vec<Compartment> = self.list_all(url).await?;

        let mut ids = vec![self.tenancy.clone()];
        ids.extend(
            listed
                .into_iter()
                .filter(|c| c.lifecycle_state == "ACTIVE")
                .map(|c| c.id),
        );
        Ok(ids)
    }

    async fn get_vcn(&self, vcn_id: &Ocid) -> Result<Vcn, CloudError> {
        self.get(self.core_url(&format!("/vcns/{vcn_id}"), &[])?)
            .await
    }

    async fn get_lpg(&self, lpg_id: &Ocid) -> Result<LocalPeeringGateway, CloudError> {
        self.get(self.core_url(&format!("/localPeeringGateways/{lpg_id}"), &[])?)
            .await
    }

    async fn route_tables_of(
        &self,
        compartment_id: &Ocid,
        vcn_id: &Ocid,
    ) -> Result<Vec<RouteTableSummary>, CloudError> {
        let url = self.core_url(
            "/routeTables",
            &[
                ("compartmentId", compartment_id.as_str()),
                ("vcnId", vcn_id.as_str()),
            ],
        )?;
        let tables: Vec<RouteTable> = self.list_all(url).await?;
        Ok(tables.into_iter().map(RouteTableSummary::from).collect())
    }

    /// Poll a new gateway until it leaves PROVISIONING.
    async fn wait_until_available(
        &self,
        mut lpg: LocalPeeringGateway,
    ) -> Result<Ocid, CloudError> {
        let mut attempts = 0;
        loop {
            match lpg.lifecycle_state.as_str() {
                "AVAILABLE" => return Ok(lpg.id),
                "PROVISIONING" if attempts < LPG_POLL_ATTEMPTS => {}
                "PROVISIONING" => {
                    return Err(CloudError::Conflict(format!(
                        "local peering gateway {} is still PROVISIONING",
                        lpg.id
                    )))
                }
                other => {
                    return Err(CloudError::Conflict(format!(
                        "local peering gateway {} is {}",
                        lpg.id, other
                    )))
                }
            }

            attempts += 1;
            tracing::debug!(lpg = %lpg.id, attempts, "waiting for local peering gateway");
            tokio::time::sleep(self.poll_interval).await;
            lpg = self.get_lpg(&lpg.id).await?;
        }
    }

    async fn create_policy(
        &self,
        name: String,
        description: String,
        statements: Vec<String>,
    ) -> Result<(), CloudError> {
        let details = CreatePolicyDetails {
            compartment_id: &self.tenancy,
            name,
            description,
            statements,
        };
        tracing::debug!(policy = %details.name, "creating IAM policy");
        self.send_json(
            Method::POST,
            self.identity_url("/policies", &[])?,
            &details,
            HeaderMap::new(),
        )
        .await?;
        Ok(())
    }
}

fn build_url(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url, CloudError> {
    let mut url = Url::parse(&format!("{base}{path}"))
        .map_err(|e| CloudError::NetworkError(format!("invalid URL '{base}{path}': {e}")))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CloudError> {
    response
        .json()
        .await
        .map_err(|e| CloudError::InvalidResponse(format!("failed to parse response: {e}")))
}

/// Map an error response to a `CloudError`.
async fn error_from_response(response: Response) -> CloudError {
    let status = response.status();
    let body = response.json::<OciErrorResponse>().await.ok();
    let code = body
        .as_ref()
        .and_then(|b| b.code.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let message = body
        .and_then(|b| b.message)
        .unwrap_or_else(|| "Unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED => CloudError::AuthFailed(message),
        StatusCode::NOT_FOUND => CloudError::NotFound(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => CloudError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => CloudError::RateLimited,
        _ => CloudError::ApiError {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

/// Requestor-side policy: lets the group connect its gateway to the acceptor tenancy.
pub fn requestor_policy_statements(
    acceptor_tenancy: &Ocid,
    requestor_group: &Ocid,
    lpg_compartment: &Ocid,
) -> Vec<String> {
    vec![
        format!("Define tenancy Acceptor as {acceptor_tenancy}"),
        format!(
            "Allow group id {requestor_group} to manage local-peering-from in compartment id {lpg_compartment}"
        ),
        format!(
            "Endorse group id {requestor_group} to manage local-peering-to in tenancy Acceptor"
        ),
        format!(
            "Endorse group id {requestor_group} to associate local-peering-gateways in compartment id {lpg_compartment} with local-peering-gateways in tenancy Acceptor"
        ),
    ]
}

/// Acceptor-side policy: admits the requestor's group to connect to this tenancy.
pub fn acceptor_policy_statements(
    requestor_tenancy: &Ocid,
    requestor_group: &Ocid,
    lpg_compartment: &Ocid,
) -> Vec<String> {
    vec![
        format!("Define tenancy Requestor as {requestor_tenancy}"),
        format!("Define group RequestorGroup as {requestor_group}"),
        format!(
            "Admit group RequestorGroup of tenancy Requestor to manage local-peering-to in compartment id {lpg_compartment}"
        ),
        format!(
            "Admit group RequestorGroup of tenancy Requestor to associate local-peering-gateways in tenancy Requestor with local-peering-gateways in compartment id {lpg_compartment}"
        ),
    ]
}

#[async_trait]
impl CloudGateway for OciClient {
    fn name(&self) -> &'static str {
        "oci"
    }

    fn tenancy_id(&self) -> &Ocid {
        &self.tenancy
    }

    async fn create_or_get_local_peering_gateway(&self, vcn_id: &Ocid) -> Result<Ocid, CloudError> {
        let vcn = self.get_vcn(vcn_id).await?;

        let list_url = self.core_url(
            "/localPeeringGateways",
            &[
                ("compartmentId", vcn.compartment_id.as_str()),
                ("vcnId", vcn_id.as_str()),
            ],
        )?;
        let existing: Vec<LocalPeeringGateway> = self.list_all(list_url).await?;
        if let Some(lpg) = existing.into_iter().find(LocalPeeringGateway::is_reusable) {
            tracing::debug!(lpg = %lpg.id, vcn = %vcn_id, "reusing local peering gateway");
            return Ok(lpg.id);
        }

        let details = CreateLpgDetails {
            compartment_id: &vcn.compartment_id,
            vcn_id,
            display_name: format!("lpg-{}", vcn_id.short(NAME_SUFFIX_LEN)),
        };
        let response = self
            .send_json(
                Method::POST,
                self.core_url("/localPeeringGateways", &[])?,
                &details,
                HeaderMap::new(),
            )
            .await?;
        let created: LocalPeeringGateway = read_json(response).await?;
        tracing::debug!(lpg = %created.id, vcn = %vcn_id, "created local peering gateway");

        self.wait_until_available(created).await
    }

    async fn connect_peering_gateways(
        &self,
        requestor_lpg: &Ocid,
        acceptor_lpg: &Ocid,
    ) -> Result<(), CloudError> {
        let url = self.core_url(
            &format!("/localPeeringGateways/{requestor_lpg}/actions/connect"),
            &[],
        )?;
        self.send_json(
            Method::POST,
            url,
            &ConnectDetails {
                peer_id: acceptor_lpg,
            },
            HeaderMap::new(),
        )
        .await?;
        Ok(())
    }

    async fn request_cross_tenancy_peering(
        &self,
        requestor_lpg: &Ocid,
        requestor_group: &Ocid,
        acceptor_tenancy: &Ocid,
    ) -> Result<(), CloudError> {
        let lpg = self.get_lpg(requestor_lpg).await?;
        self.create_policy(
            format!("lpg-requestor-{}", requestor_lpg.short(NAME_SUFFIX_LEN)),
            format!("Peering of {requestor_lpg} with tenancy {acceptor_tenancy}"),
            requestor_policy_statements(acceptor_tenancy, requestor_group, &lpg.compartment_id),
        )
        .await
    }

    async fn accept_cross_tenancy_peering(
        &self,
        acceptor_lpg: &Ocid,
        requestor_group: &Ocid,
        requestor_tenancy: &Ocid,
    ) -> Result<(), CloudError> {
        let lpg = self.get_lpg(acceptor_lpg).await?;
        self.create_policy(
            format!("lpg-acceptor-{}", acceptor_lpg.short(NAME_SUFFIX_LEN)),
            format!("Peering of {acceptor_lpg} with tenancy {requestor_tenancy}"),
            acceptor_policy_statements(requestor_tenancy, requestor_group, &lpg.compartment_id),
        )
        .await
    }

    async fn add_route_rule(
        &self,
        route_table: &RouteTableRef,
        destination: &Cidr,
        target_lpg: &Ocid,
    ) -> Result<(), CloudError> {
        let table_id = match route_table {
            RouteTableRef::Table(id) => id.clone(),
            RouteTableRef::VcnDefault(vcn_id) => {
                self.get_vcn(vcn_id)
                    .await?
                    .default_route_table_id
                    .ok_or_else(|| {
                        CloudError::InvalidResponse(format!("VCN {vcn_id} has no default route table"))
                    })?
            }
        };

        let url = self.core_url(&format!("/routeTables/{table_id}"), &[])?;
        let response = self
            .send(Method::GET, url.clone(), None, HeaderMap::new())
            .await?;
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let table: RouteTable = read_json(response).await?;

        let mut rules = table.route_rules;
        for rule in &mut rules {
            // cidrBlock is the deprecated alias of destination
            if rule.contains_key("destination") {
                rule.remove("cidrBlock");
            }
        }
        rules.push(cidr_route_rule(destination, target_lpg));

        let mut extra = HeaderMap::new();
        if let Some(etag) = etag {
            extra.insert(
                IF_MATCH,
                HeaderValue::from_str(&etag).map_err(|e| CloudError::InvalidResponse(e.to_string()))?,
            );
        }

        tracing::debug!(route_table = %table_id, %destination, rules = rules.len(), "updating route table");
        self.send_json(
            Method::PUT,
            url,
            &UpdateRouteTableDetails { route_rules: rules },
            extra,
        )
        .await?;
        Ok(())
    }

    async fn list_vcns(&self) -> Result<Vec<VcnSummary>, CloudError> {
        let mut vcns = Vec::new();
        for compartment in self.visible_compartments().await? {
            let url = self.core_url("/vcns", &[("compartmentId", compartment.as_str())])?;
            let listed: Vec<Vcn> = self.list_all(url).await?;
            vcns.extend(listed.into_iter().map(VcnSummary::from));
        }
        Ok(vcns)
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, CloudError> {
        let url = self.identity_url("/groups", &[("compartmentId", self.tenancy.as_str())])?;
        let groups: Vec<Group> = self.list_all(url).await?;
        Ok(groups.into_iter().map(GroupSummary::from).collect())
    }

    async fn list_route_tables(
        &self,
        vcn_id: Option<&Ocid>,
    ) -> Result<Vec<RouteTableSummary>, CloudError> {
        match vcn_id {
            Some(vcn_id) => {
                let vcn = self.get_vcn(vcn_id).await?;
                self.route_tables_of(&vcn.compartment_id, vcn_id).await
            }
            None => {
                let mut tables = Vec::new();
                for vcn in self.list_vcns().await? {
                    tables.extend(self.route_tables_of(&vcn.compartment_id, &vcn.id).await?);
                }
                Ok(tables)
            }
        }
    }
}

fn cidr_route_rule(destination: &Cidr, target_lpg: &Ocid) -> Map<String, Value> {
    let mut rule = Map::new();
    rule.insert("destination".into(), Value::String(destination.to_string()));
    rule.insert("destinationType".into(), Value::String("CIDR_BLOCK".into()));
    rule.insert(
        "networkEntityId".into(),
        Value::String(target_lpg.to_string()),
    );
    rule
}

// =============================================================================
// OCI API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct OciErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Compartment {
    id: Ocid,
    lifecycle_state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Vcn {
    id: Ocid,
    compartment_id: Ocid,
    #[serde(default)]
    display_name: Option<String>,
    lifecycle_state: String,
    #[serde(default)]
    cidr_blocks: Vec<String>,
    #[serde(default)]
    cidr_block: Option<String>,
    #[serde(default)]
    default_route_table_id: Option<Ocid>,
}

impl From<Vcn> for VcnSummary {
    fn from(vcn: Vcn) -> Self {
        let cidr_blocks = if vcn.cidr_blocks.is_empty() {
            vcn.cidr_block.into_iter().collect()
        } else {
            vcn.cidr_blocks
        };
        VcnSummary {
            id: vcn.id,
            display_name: vcn.display_name.unwrap_or_default(),
            lifecycle_state: vcn.lifecycle_state,
            compartment_id: vcn.compartment_id,
            cidr_blocks,
            default_route_table_id: vcn.default_route_table_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteTable {
    id: Ocid,
    vcn_id: Ocid,
    #[serde(default)]
    display_name: Option<String>,
    lifecycle_state: String,
    #[serde(default)]
    route_rules: Vec<Map<String, Value>>,
}

impl From<RouteTable> for RouteTableSummary {
    fn from(table: RouteTable) -> Self {
        RouteTableSummary {
            id: table.id,
            display_name: table.display_name.unwrap_or_default(),
            lifecycle_state: table.lifecycle_state,
            vcn_id: table.vcn_id,
            rule_count: table.route_rules.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalPeeringGateway {
    id: Ocid,
    compartment_id: Ocid,
    lifecycle_state: String,
    #[serde(default)]
    peering_status: Option<String>,
}

impl LocalPeeringGateway {
    /// Not yet peered and ready for use.
    fn is_reusable(&self) -> bool {
        self.lifecycle_state == "AVAILABLE" && self.peering_status.as_deref() == Some("NEW")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Group {
    id: Ocid,
    name: String,
    lifecycle_state: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<Group> for GroupSummary {
    fn from(group: Group) -> Self {
        GroupSummary {
            id: group.id,
            name: group.name,
            lifecycle_state: group.lifecycle_state,
            description: group.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLpgDetails<'a> {
    compartment_id: &'a Ocid,
    vcn_id: &'a Ocid,
    display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectDetails<'a> {
    peer_id: &'a Ocid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRouteTableDetails {
    route_rules: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePolicyDetails<'a> {
    compartment_id: &'a Ocid,
    name: String,
    description: String,
    statements: Vec<String>,
}
