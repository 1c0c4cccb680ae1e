//! Policy operations against an in-memory control plane and runtime.
//!
//! Covered scenarios:
//! - invalid policies never reach the control plane
//! - add / list / clear on an endpoint, including foreign policy types
//! - clear reports the attempted count whether removal succeeds or fails
//! - container lookup: found, unknown container, missing namespace, no endpoints

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::{ContainerId, EndpointId, NamespaceId};
use hcnproxy_core::proxy::{
    add_policy, clear_policies, get_endpoint_from_container, list_policies,
};
use hcnproxy_core::{Policy, PolicyBuilder};
use hcnproxy_cri::RuntimeApi;
use hcnproxy_cri::api::{Container, ContainerStatusResponse};
use hcnproxy_hcn::ControlPlane;
use hcnproxy_hcn::schema::{
    EndpointPolicy, EndpointPolicyType, HostComputeEndpoint, ModifyEndpointSettingRequest,
    RequestType,
};
use serde_json::json;

const ENDPOINT: &str = "5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10";
const SECOND_ENDPOINT: &str = "7c2e9a4b-3d1f-4e5a-8b6c-9d0e1f2a3b4c";
const NAMESPACE: &str = "0f6d5a5e-7a47-4c8e-9d4b-2f6b1c0e9a11";

#[derive(Default)]
struct FakeControlPlane {
    endpoints: Mutex<HashMap<String, Vec<EndpointPolicy>>>,
    namespaces: HashMap<String, Vec<EndpointId>>,
    fail_modify: bool,
    calls: AtomicUsize,
}

impl FakeControlPlane {
    fn with_endpoint(self, id: &str, policies: Vec<EndpointPolicy>) -> Self {
        let _ = self.endpoints.lock().unwrap().insert(id.to_owned(), policies);
        self
    }

    fn policies(&self, id: &str) -> Vec<EndpointPolicy> {
        self.endpoints.lock().unwrap()[id].clone()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ControlPlane for FakeControlPlane {
    fn endpoint(&self, id: &EndpointId) -> Result<HostComputeEndpoint> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        let endpoints = self.endpoints.lock().unwrap();
        let policies = endpoints
            .get(id.as_str())
            .ok_or_else(|| HcnProxyError::NotFound {
                kind: "endpoint",
                id: id.to_string(),
            })?;
        Ok(HostComputeEndpoint {
            id: id.to_string(),
            policies: policies.clone(),
            ..HostComputeEndpoint::default()
        })
    }

    fn modify_endpoint(&self, id: &EndpointId, request: &ModifyEndpointSettingRequest) -> Result<()> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_modify {
            return Err(HcnProxyError::ControlPlane {
                operation: "HcnModifyEndpoint",
                message: "access is denied".into(),
            });
        }
        let mut endpoints = self.endpoints.lock().unwrap();
        let policies = endpoints.get_mut(id.as_str()).expect("endpoint exists");
        let requested = request.policies()?.policies;
        match request.request_type {
            RequestType::Add => policies.extend(requested),
            RequestType::Remove => policies.retain(|p| !requested.contains(p)),
            RequestType::Update | RequestType::Refresh => unreachable!(),
        }
        Ok(())
    }

    fn namespace_endpoint_ids(&self, namespace: &NamespaceId) -> Result<Vec<EndpointId>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .namespaces
            .get(namespace.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct FakeRuntime {
    containers: Vec<(String, Option<String>)>,
}

impl RuntimeApi for FakeRuntime {
    async fn list_containers(&mut self) -> Result<Vec<Container>> {
        Ok(self
            .containers
            .iter()
            .map(|(id, _)| Container {
                id: id.clone(),
                ..Container::default()
            })
            .collect())
    }

    async fn container_status(
        &mut self,
        container_id: &str,
        _verbose: bool,
    ) -> Result<ContainerStatusResponse> {
        let namespace = self
            .containers
            .iter()
            .find(|(id, _)| id == container_id)
            .and_then(|(_, ns)| ns.clone())
            .unwrap_or_default();
        let info = json!({"runtimeSpec": {"windows": {"network": {"networkNamespace": namespace}}}});
        Ok(ContainerStatusResponse {
            status: None,
            info: HashMap::from([("info".to_owned(), info.to_string())]),
        })
    }
}

fn endpoint() -> EndpointId {
    EndpointId::parse(ENDPOINT).unwrap()
}

fn foreign_policy() -> EndpointPolicy {
    EndpointPolicy {
        kind: EndpointPolicyType::Other("OutBoundNAT".into()),
        settings: json!({"Exceptions": ["10.0.0.0/8"]}),
    }
}

fn proxy_policy(port: &str) -> EndpointPolicy {
    Policy::new(port).to_endpoint_policy().unwrap()
}

// ── add ──────────────────────────────────────────────────────────────

#[test]
fn add_rejects_missing_port_without_remote_calls() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![]);

    let err = add_policy(&control_plane, &endpoint(), &Policy::default()).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(control_plane.calls(), 0);
}

#[test]
fn add_rejects_zero_port_without_remote_calls() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![]);

    let err = add_policy(&control_plane, &endpoint(), &Policy::new("0")).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(control_plane.calls(), 0);
}

#[test]
fn add_rejects_padded_port_without_remote_calls() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![]);

    let err = add_policy(&control_plane, &endpoint(), &Policy::new(" 15001 ")).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(control_plane.calls(), 0);
}

#[test]
fn add_rejects_empty_filter_without_remote_calls() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![]);
    let policy = Policy {
        user_sid: Some(String::new()),
        ..Policy::new("15001")
    };

    let err = add_policy(&control_plane, &endpoint(), &policy).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(control_plane.calls(), 0);
}

#[test]
fn add_then_list_returns_same_policy() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![foreign_policy()]);
    let policy = PolicyBuilder::new("15001")
        .user_sid("system")
        .remote_ports("80")
        .priority(5)
        .build()
        .unwrap();

    add_policy(&control_plane, &endpoint(), &policy).unwrap();

    assert_eq!(control_plane.policies(ENDPOINT).len(), 2);
    assert_eq!(list_policies(&control_plane, &endpoint()).unwrap(), vec![policy]);
}

#[test]
fn add_to_unknown_endpoint_fails() {
    let control_plane = FakeControlPlane::default();

    let err = add_policy(&control_plane, &endpoint(), &Policy::new("15001")).unwrap_err();

    assert!(matches!(err, HcnProxyError::NotFound { kind: "endpoint", .. }));
}

// ── list ─────────────────────────────────────────────────────────────

#[test]
fn list_without_proxy_policies_is_empty() {
    let control_plane = FakeControlPlane::default().with_endpoint(ENDPOINT, vec![foreign_policy()]);

    let policies = list_policies(&control_plane, &endpoint()).unwrap();

    assert!(policies.is_empty());
}

#[test]
fn list_surfaces_malformed_policies() {
    let broken = EndpointPolicy {
        kind: EndpointPolicyType::L4WfpProxy,
        settings: json!({"Port": ["not", "a", "string"]}),
    };
    let control_plane = FakeControlPlane::default()
        .with_endpoint(ENDPOINT, vec![proxy_policy("15001"), foreign_policy(), broken]);

    let err = list_policies(&control_plane, &endpoint()).unwrap_err();

    assert!(matches!(err, HcnProxyError::MalformedPolicy { index: 1, .. }));
}

// ── clear ────────────────────────────────────────────────────────────

#[test]
fn clear_removes_only_proxy_policies() {
    let control_plane = FakeControlPlane::default().with_endpoint(
        ENDPOINT,
        vec![proxy_policy("15001"), foreign_policy(), proxy_policy("15006")],
    );

    let removed = clear_policies(&control_plane, &endpoint()).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(control_plane.policies(ENDPOINT), vec![foreign_policy()]);
}

#[test]
fn clear_reports_attempted_count_when_removal_fails() {
    let control_plane = FakeControlPlane {
        fail_modify: true,
        ..FakeControlPlane::default()
    }
    .with_endpoint(
        ENDPOINT,
        vec![proxy_policy("15001"), proxy_policy("15006"), proxy_policy("15008")],
    );

    let err = clear_policies(&control_plane, &endpoint()).unwrap_err();

    assert_eq!(err.attempted(), Some(3));
    assert_eq!(control_plane.policies(ENDPOINT).len(), 3);
}

#[test]
fn clear_on_empty_endpoint_makes_no_modification() {
    let control_plane = FakeControlPlane {
        fail_modify: true,
        ..FakeControlPlane::default()
    }
    .with_endpoint(ENDPOINT, vec![foreign_policy()]);

    assert_eq!(clear_policies(&control_plane, &endpoint()).unwrap(), 0);
    assert_eq!(control_plane.calls(), 1);
}

// ── lookup ───────────────────────────────────────────────────────────

fn lookup_control_plane(endpoints: Vec<EndpointId>) -> FakeControlPlane {
    FakeControlPlane {
        namespaces: HashMap::from([(NAMESPACE.to_owned(), endpoints)]),
        ..FakeControlPlane::default()
    }
}

#[tokio::test]
async fn lookup_returns_every_attached_endpoint() {
    let control_plane = lookup_control_plane(vec![
        EndpointId::parse(ENDPOINT).unwrap(),
        EndpointId::parse(SECOND_ENDPOINT).unwrap(),
    ]);
    let mut runtime = FakeRuntime {
        containers: vec![("c1".into(), Some(NAMESPACE.into()))],
    };

    let endpoints = get_endpoint_from_container(&control_plane, &mut runtime, &ContainerId::new("c1"))
        .await
        .unwrap();

    let ids: Vec<_> = endpoints.iter().map(EndpointId::as_str).collect();
    assert_eq!(ids, [ENDPOINT, SECOND_ENDPOINT]);
}

#[tokio::test]
async fn lookup_of_unknown_container_skips_control_plane() {
    let control_plane = lookup_control_plane(vec![endpoint()]);
    let mut runtime = FakeRuntime {
        containers: vec![("c1".into(), Some(NAMESPACE.into()))],
    };

    let err = get_endpoint_from_container(&control_plane, &mut runtime, &ContainerId::new("c2"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::NotFound { kind: "container", .. }));
    assert_eq!(control_plane.calls(), 0);
}

#[tokio::test]
async fn lookup_of_container_without_namespace_is_distinct() {
    let control_plane = lookup_control_plane(vec![endpoint()]);
    let mut runtime = FakeRuntime {
        containers: vec![("c1".into(), None)],
    };

    let err = get_endpoint_from_container(&control_plane, &mut runtime, &ContainerId::new("c1"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::MissingNamespace { .. }));
    assert_eq!(control_plane.calls(), 0);
}

#[tokio::test]
async fn lookup_with_no_attached_endpoint_fails() {
    let control_plane = lookup_control_plane(vec![]);
    let mut runtime = FakeRuntime {
        containers: vec![("c1".into(), Some(NAMESPACE.into()))],
    };

    let err = get_endpoint_from_container(&control_plane, &mut runtime, &ContainerId::new("c1"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::NoEndpoints { .. }));
}
