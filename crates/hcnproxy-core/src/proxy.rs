//! Proxy policy operations on HNS endpoints.
//!
//! Each function performs a handful of direct control-plane calls and
//! returns the first error it meets. Nothing is cached or retried.

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::{ContainerId, EndpointId};
use hcnproxy_cri::{CriParameters, RuntimeApi};
use hcnproxy_hcn::ControlPlane;
use hcnproxy_hcn::schema::{EndpointPolicy, PolicyEndpointRequest, RequestType};

use crate::policy::Policy;

/// Adds a layer-4 proxy policy to an endpoint.
///
/// The policy is validated before the control plane is contacted. The
/// endpoint is then looked up, so a missing endpoint fails before the
/// modification is attempted.
///
/// # Errors
///
/// Returns an error if the policy is invalid, the endpoint does not exist,
/// or HNS refuses the policy.
pub fn add_policy(
    control_plane: &dyn ControlPlane,
    endpoint: &EndpointId,
    policy: &Policy,
) -> Result<()> {
    policy.validate()?;
    let request = PolicyEndpointRequest {
        policies: vec![policy.to_endpoint_policy()?],
    };

    let _ = control_plane.endpoint(endpoint)?;
    control_plane.apply_policy(endpoint, RequestType::Add, &request)?;
    tracing::info!(
        endpoint = %endpoint,
        port = %policy.proxy_port,
        priority = policy.priority,
        "proxy policy added"
    );
    Ok(())
}

/// Returns the proxy policies active on an endpoint, in HNS order.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be queried, or
/// [`HcnProxyError::MalformedPolicy`] if one of its proxy policies cannot
/// be decoded.
pub fn list_policies(control_plane: &dyn ControlPlane, endpoint: &EndpointId) -> Result<Vec<Policy>> {
    raw_policies(control_plane, endpoint)?
        .iter()
        .enumerate()
        .map(|(index, policy)| Policy::from_endpoint_policy(index, policy))
        .collect()
}

/// Removes every proxy policy from an endpoint and returns how many were
/// targeted.
///
/// All policies are removed with a single request. The count is taken
/// before the removal, so a failed removal still reports it through
/// [`HcnProxyError::ClearFailed`].
///
/// # Errors
///
/// Returns the lookup error if the endpoint cannot be queried, or
/// [`HcnProxyError::ClearFailed`] if the removal request fails.
pub fn clear_policies(control_plane: &dyn ControlPlane, endpoint: &EndpointId) -> Result<usize> {
    let policies = raw_policies(control_plane, endpoint)?;
    let attempted = policies.len();
    if attempted == 0 {
        tracing::debug!(endpoint = %endpoint, "no proxy policies to remove");
        return Ok(0);
    }

    let request = PolicyEndpointRequest { policies };
    control_plane
        .apply_policy(endpoint, RequestType::Remove, &request)
        .map_err(|e| HcnProxyError::ClearFailed {
            attempted,
            source: Box::new(e),
        })?;
    tracing::info!(endpoint = %endpoint, count = attempted, "proxy policies removed");
    Ok(attempted)
}

/// Returns the endpoints attached to a container's network namespace.
///
/// The control plane is only contacted once the runtime has produced a
/// namespace.
///
/// # Errors
///
/// Returns `NotFound` if the runtime does not know the container,
/// `MissingNamespace` if it has no namespace, `NoEndpoints` if nothing is
/// attached to the namespace, or the propagated remote error.
pub async fn get_endpoint_from_container<R: RuntimeApi>(
    control_plane: &dyn ControlPlane,
    runtime: &mut R,
    container: &ContainerId,
) -> Result<Vec<EndpointId>> {
    let namespace = hcnproxy_cri::resolve_namespace(runtime, container).await?;
    let endpoints = control_plane.namespace_endpoint_ids(&namespace)?;
    if endpoints.is_empty() {
        return Err(HcnProxyError::NoEndpoints {
            namespace: namespace.to_string(),
        });
    }
    tracing::debug!(
        container = %container,
        namespace = %namespace,
        count = endpoints.len(),
        "resolved container endpoints"
    );
    Ok(endpoints)
}

/// Connects to the runtime named in `params`, resolves the endpoints of
/// `container`, and closes the connection.
///
/// # Errors
///
/// Returns an error if the runtime cannot be reached, or any error of
/// [`get_endpoint_from_container`].
pub async fn lookup_endpoints(
    control_plane: &dyn ControlPlane,
    container: &ContainerId,
    params: &CriParameters,
) -> Result<Vec<EndpointId>> {
    let mut runtime = hcnproxy_cri::connect(params).await?;
    get_endpoint_from_container(control_plane, &mut runtime, container).await
}

/// Returns the raw `L4WFPPROXY` policies of an endpoint.
fn raw_policies(
    control_plane: &dyn ControlPlane,
    endpoint: &EndpointId,
) -> Result<Vec<EndpointPolicy>> {
    let hns_endpoint = control_plane.endpoint(endpoint)?;
    let policies: Vec<_> = hns_endpoint.l4_proxy_policies().cloned().collect();
    tracing::debug!(
        endpoint = %endpoint,
        total = hns_endpoint.policies.len(),
        proxy = policies.len(),
        "fetched endpoint policies"
    );
    Ok(policies)
}
