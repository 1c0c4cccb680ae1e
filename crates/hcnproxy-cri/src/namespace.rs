//! Container to network namespace resolution.
//!
//! On Windows, containerd reports the HNS namespace a container joined in
//! the OCI runtime spec it keeps in the verbose status `info` document:
//! `runtimeSpec.windows.network.networkNamespace`.

use std::collections::HashMap;

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::{ContainerId, NamespaceId};

use crate::client::RuntimeApi;

/// Key of the verbose status entry holding the runtime's JSON details.
pub const INFO_KEY: &str = "info";

/// JSON pointer to the namespace inside the `info` document.
pub const NETWORK_NAMESPACE_POINTER: &str = "/runtimeSpec/windows/network/networkNamespace";

/// Resolves the network namespace of `container`.
///
/// Lists the runtime's containers, then fetches verbose status for the
/// exact match only.
///
/// # Errors
///
/// Returns `NotFound` if no container has this ID, `MissingNamespace` if
/// its status carries no namespace, or the propagated runtime error.
pub async fn resolve_namespace<R: RuntimeApi>(
    runtime: &mut R,
    container: &ContainerId,
) -> Result<NamespaceId> {
    let containers = runtime.list_containers().await?;
    let Some(found) = containers.iter().find(|c| c.id == container.as_str()) else {
        tracing::debug!(container = %container, listed = containers.len(), "container not listed");
        return Err(HcnProxyError::NotFound {
            kind: "container",
            id: container.to_string(),
        });
    };

    let status = runtime.container_status(&found.id, true).await?;
    let namespace = namespace_from_info(container, &status.info)?;
    tracing::debug!(container = %container, namespace = %namespace, "resolved namespace");
    Ok(namespace)
}

/// Extracts the network namespace from a verbose status `info` map.
///
/// # Errors
///
/// Returns `MissingNamespace` if the `info` entry or the namespace field is
/// absent or empty, and a serialization error if `info` is not valid JSON.
pub fn namespace_from_info(
    container: &ContainerId,
    info: &HashMap<String, String>,
) -> Result<NamespaceId> {
    let missing = || HcnProxyError::MissingNamespace {
        container: container.to_string(),
    };
    let raw = info.get(INFO_KEY).ok_or_else(missing)?;
    let document: serde_json::Value = serde_json::from_str(raw)?;
    document
        .pointer(NETWORK_NAMESPACE_POINTER)
        .and_then(serde_json::Value::as_str)
        .filter(|ns| !ns.is_empty())
        .map(NamespaceId::new)
        .ok_or_else(missing)
}
