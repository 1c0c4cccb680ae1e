//! JSON schema of the Host Compute Network API.
//!
//! Field names follow the HNS v2 schema verbatim (`PascalCase`, with a
//! few all-caps exceptions such as `ID` and `UserSID`). Empty strings and
//! zero values are omitted on output, matching how HNS clients encode them.

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::EndpointId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire name of the layer-4 WFP proxy policy type.
pub const L4_WFP_PROXY: &str = "L4WFPPROXY";

/// Wire name of the endpoint resource type in a namespace.
pub const NAMESPACE_RESOURCE_ENDPOINT: &str = "Endpoint";

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u16) -> bool {
    *value == 0
}

/// Type tag of an endpoint policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointPolicyType {
    /// Layer-4 proxy redirection through the Windows Filtering Platform.
    L4WfpProxy,
    /// Any other policy type HNS reports (`OutBoundNAT`, `ACL`, ...).
    Other(String),
}

impl From<String> for EndpointPolicyType {
    fn from(value: String) -> Self {
        if value == L4_WFP_PROXY {
            Self::L4WfpProxy
        } else {
            Self::Other(value)
        }
    }
}

impl From<EndpointPolicyType> for String {
    fn from(value: EndpointPolicyType) -> Self {
        match value {
            EndpointPolicyType::L4WfpProxy => L4_WFP_PROXY.to_owned(),
            EndpointPolicyType::Other(other) => other,
        }
    }
}

/// A policy attached to an endpoint: a type tag plus type-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointPolicy {
    /// Policy type.
    #[serde(rename = "Type")]
    pub kind: EndpointPolicyType,
    /// Type-specific settings document.
    #[serde(rename = "Settings", default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
}

impl EndpointPolicy {
    /// Returns `true` if this is a layer-4 proxy policy.
    #[must_use]
    pub fn is_l4_proxy(&self) -> bool {
        self.kind == EndpointPolicyType::L4WfpProxy
    }
}

/// Traffic filter of a layer-4 proxy policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FiveTuple {
    /// Protocol numbers, comma separated (`"6"` for TCP).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocols: String,
    /// Local addresses to match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_addresses: String,
    /// Remote addresses to match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remote_addresses: String,
    /// Local port or port range to match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_ports: String,
    /// Remote port or port range to match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remote_ports: String,
    /// WFP filter weight.
    #[serde(skip_serializing_if = "is_zero")]
    pub priority: u16,
}

/// Settings document of an `L4WFPPROXY` endpoint policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct L4WfpProxyPolicySetting {
    /// Redirect inbound rather than outbound traffic.
    #[serde(rename = "InboundNAT", skip_serializing_if = "is_false")]
    pub inbound_nat: bool,
    /// Port the proxy listens on.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    /// Traffic selector.
    pub filter_tuple: FiveTuple,
    /// Traffic originating from this SID is not redirected.
    #[serde(rename = "UserSID", skip_serializing_if = "String::is_empty")]
    pub user_sid: String,
}

/// Body of a policy add/remove request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyEndpointRequest {
    /// Policies to add or remove.
    #[serde(default)]
    pub policies: Vec<EndpointPolicy>,
}

/// Kind of modification applied to an endpoint resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Attach the resource.
    Add,
    /// Detach the resource.
    Remove,
    /// Replace the resource.
    Update,
    /// Re-apply the resource.
    Refresh,
}

/// Endpoint resource targeted by a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointResourceType {
    /// Endpoint policies.
    Policy,
}

/// Request passed to `HcnModifyEndpoint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyEndpointSettingRequest {
    /// Resource being modified.
    pub resource_type: EndpointResourceType,
    /// Kind of modification.
    pub request_type: RequestType,
    /// Resource-specific payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,
}

impl ModifyEndpointSettingRequest {
    /// Builds a policy modification carrying `policies`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy list cannot be serialized.
    pub fn policy(request_type: RequestType, policies: &PolicyEndpointRequest) -> Result<Self> {
        Ok(Self {
            resource_type: EndpointResourceType::Policy,
            request_type,
            settings: serde_json::to_value(policies)?,
        })
    }

    /// Decodes the payload of a policy modification.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a policy list.
    pub fn policies(&self) -> Result<PolicyEndpointRequest> {
        Ok(PolicyEndpointRequest::deserialize(&self.settings)?)
    }
}

/// An endpoint as returned by `HcnQueryEndpointProperties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HostComputeEndpoint {
    /// Endpoint GUID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Endpoint name.
    pub name: String,
    /// GUID of the network the endpoint belongs to.
    pub host_compute_network: String,
    /// GUID of the namespace the endpoint is attached to, if any.
    pub host_compute_namespace: String,
    /// Policies currently applied to the endpoint.
    pub policies: Vec<EndpointPolicy>,
}

impl HostComputeEndpoint {
    /// Returns the layer-4 proxy policies of this endpoint, in order.
    pub fn l4_proxy_policies(&self) -> impl Iterator<Item = &EndpointPolicy> {
        self.policies.iter().filter(|p| p.is_l4_proxy())
    }
}

/// A resource attached to a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamespaceResource {
    /// Resource type (`Endpoint`, `Container`).
    #[serde(rename = "Type")]
    pub kind: String,
    /// Resource-specific data.
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct NamespaceResourceEndpoint {
    #[serde(rename = "ID")]
    id: String,
}

/// A namespace as returned by `HcnQueryNamespaceProperties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HostComputeNamespace {
    /// Namespace GUID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Resources attached to the namespace.
    pub resources: Vec<NamespaceResource>,
}

impl HostComputeNamespace {
    /// Returns the IDs of the endpoints attached to this namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint resource has no parsable `ID`.
    pub fn endpoint_ids(&self) -> Result<Vec<EndpointId>> {
        self.resources
            .iter()
            .filter(|r| r.kind == NAMESPACE_RESOURCE_ENDPOINT)
            .map(|r| {
                let endpoint = NamespaceResourceEndpoint::deserialize(&r.data)?;
                EndpointId::parse(endpoint.id)
            })
            .collect()
    }
}

/// Schema version carried by property queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchemaVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

/// Property query passed to the `HcnQuery*Properties` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostComputeQuery {
    /// Requested schema version.
    pub schema_version: SchemaVersion,
    /// Query flags (0 = default detail level).
    pub flags: u32,
}

impl Default for HostComputeQuery {
    fn default() -> Self {
        Self {
            schema_version: SchemaVersion { major: 2, minor: 0 },
            flags: 0,
        }
    }
}

impl HostComputeQuery {
    /// Serializes the query to the JSON string HNS expects.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(HcnProxyError::from)
    }
}
