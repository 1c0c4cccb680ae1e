//! Control-plane abstraction for platform-agnostic operation.

mod unsupported;
#[cfg(windows)]
#[allow(unsafe_code)]
mod hcn;

use hcnproxy_common::error::Result;
use hcnproxy_common::types::{EndpointId, NamespaceId};

pub use self::unsupported::UnsupportedControlPlane;
#[cfg(windows)]
pub use self::hcn::HcnControlPlane;

use crate::schema::{
    HostComputeEndpoint, ModifyEndpointSettingRequest, PolicyEndpointRequest, RequestType,
};

/// Access to the host networking control plane.
///
/// Implementors perform single blocking calls. Nothing is cached between
/// calls; every method reflects the control plane's current state.
pub trait ControlPlane: Send + Sync {
    /// Fetches an endpoint and the policies applied to it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the endpoint does not exist, or a control-plane
    /// error if the query fails.
    fn endpoint(&self, id: &EndpointId) -> Result<HostComputeEndpoint>;

    /// Applies a modification request to an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be opened or the
    /// modification is refused.
    fn modify_endpoint(&self, id: &EndpointId, request: &ModifyEndpointSettingRequest)
    -> Result<()>;

    /// Lists the endpoints attached to a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be opened or queried.
    fn namespace_endpoint_ids(&self, namespace: &NamespaceId) -> Result<Vec<EndpointId>>;

    /// Returns whether this control plane is reachable on the current platform.
    fn is_available(&self) -> bool;

    /// Adds or removes a set of policies on an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be serialized or applied.
    fn apply_policy(
        &self,
        id: &EndpointId,
        request_type: RequestType,
        policies: &PolicyEndpointRequest,
    ) -> Result<()> {
        let request = ModifyEndpointSettingRequest::policy(request_type, policies)?;
        tracing::debug!(
            endpoint = %id,
            request = ?request_type,
            count = policies.policies.len(),
            "modifying endpoint policies"
        );
        self.modify_endpoint(id, &request)
    }
}

/// Creates the control plane for the current platform.
#[must_use]
pub fn detect_control_plane() -> Box<dyn ControlPlane> {
    #[cfg(windows)]
    {
        Box::new(HcnControlPlane::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedControlPlane::new())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::schema::{EndpointPolicy, EndpointPolicyType, EndpointResourceType};

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<(EndpointId, ModifyEndpointSettingRequest)>>,
    }

    impl ControlPlane for Recorder {
        fn endpoint(&self, id: &EndpointId) -> Result<HostComputeEndpoint> {
            Ok(HostComputeEndpoint {
                id: id.to_string(),
                ..HostComputeEndpoint::default()
            })
        }

        fn modify_endpoint(
            &self,
            id: &EndpointId,
            request: &ModifyEndpointSettingRequest,
        ) -> Result<()> {
            self.requests
                .lock()
                .unwrap()
                .push((id.clone(), request.clone()));
            Ok(())
        }

        fn namespace_endpoint_ids(&self, _namespace: &NamespaceId) -> Result<Vec<EndpointId>> {
            Ok(Vec::new())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn apply_policy_issues_policy_modification() {
        let recorder = Recorder::default();
        let id = EndpointId::parse("5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10").unwrap();
        let policies = PolicyEndpointRequest {
            policies: vec![EndpointPolicy {
                kind: EndpointPolicyType::L4WfpProxy,
                settings: json!({"Port": "15001"}),
            }],
        };

        recorder
            .apply_policy(&id, RequestType::Add, &policies)
            .unwrap();

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (target, request) = &requests[0];
        assert_eq!(target, &id);
        assert_eq!(request.resource_type, EndpointResourceType::Policy);
        assert_eq!(request.request_type, RequestType::Add);
        assert_eq!(request.policies().unwrap(), policies);
    }

    #[test]
    fn detected_control_plane_matches_platform() {
        let control_plane = detect_control_plane();
        assert_eq!(control_plane.is_available(), cfg!(windows));
    }
}
