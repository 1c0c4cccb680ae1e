//! Namespace resolution against an in-memory runtime.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::ContainerId;
use hcnproxy_cri::RuntimeApi;
use hcnproxy_cri::api::{Container, ContainerState, ContainerStatus, ContainerStatusResponse};
use hcnproxy_cri::resolve_namespace;

#[derive(Default)]
struct FakeRuntime {
    containers: Vec<(String, Option<String>)>,
    status_calls: Vec<(String, bool)>,
}

impl FakeRuntime {
    fn with(mut self, id: &str, namespace: Option<&str>) -> Self {
        self.containers
            .push((id.to_owned(), namespace.map(str::to_owned)));
        self
    }
}

impl RuntimeApi for FakeRuntime {
    async fn list_containers(&mut self) -> Result<Vec<Container>> {
        Ok(self
            .containers
            .iter()
            .map(|(id, _)| Container {
                id: id.clone(),
                state: ContainerState::ContainerRunning as i32,
                ..Container::default()
            })
            .collect())
    }

    async fn container_status(
        &mut self,
        container_id: &str,
        verbose: bool,
    ) -> Result<ContainerStatusResponse> {
        self.status_calls.push((container_id.to_owned(), verbose));
        let namespace = self
            .containers
            .iter()
            .find(|(id, _)| id == container_id)
            .and_then(|(_, ns)| ns.clone());
        let spec = namespace.map_or_else(
            || serde_json::json!({"runtimeSpec": {"windows": {}}}),
            |ns| serde_json::json!({"runtimeSpec": {"windows": {"network": {"networkNamespace": ns}}}}),
        );
        Ok(ContainerStatusResponse {
            status: Some(ContainerStatus {
                id: container_id.to_owned(),
                ..ContainerStatus::default()
            }),
            info: HashMap::from([("info".to_owned(), spec.to_string())]),
        })
    }
}

#[tokio::test]
async fn resolves_namespace_of_listed_container() {
    let mut runtime = FakeRuntime::default()
        .with("aaa", Some("11111111-1111-1111-1111-111111111111"))
        .with("bbb", Some("22222222-2222-2222-2222-222222222222"));

    let ns = resolve_namespace(&mut runtime, &ContainerId::new("bbb"))
        .await
        .expect("resolve");

    assert_eq!(ns.as_str(), "22222222-2222-2222-2222-222222222222");
    assert_eq!(runtime.status_calls, vec![("bbb".to_owned(), true)]);
}

#[tokio::test]
async fn unknown_container_is_not_found_without_status_calls() {
    let mut runtime = FakeRuntime::default().with("aaa", Some("ns"));

    let err = resolve_namespace(&mut runtime, &ContainerId::new("zzz"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::NotFound { kind: "container", .. }));
    assert!(runtime.status_calls.is_empty());
}

#[tokio::test]
async fn prefix_of_container_id_does_not_match() {
    let mut runtime = FakeRuntime::default().with("abcdef", Some("ns"));

    let err = resolve_namespace(&mut runtime, &ContainerId::new("abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::NotFound { .. }));
}

#[tokio::test]
async fn container_without_namespace_is_distinct_error() {
    let mut runtime = FakeRuntime::default().with("aaa", None);

    let err = resolve_namespace(&mut runtime, &ContainerId::new("aaa"))
        .await
        .unwrap_err();

    assert!(matches!(err, HcnProxyError::MissingNamespace { .. }));
}
