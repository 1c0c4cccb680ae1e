//! Fallback control plane for platforms without HNS.

use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::{EndpointId, NamespaceId};

use super::ControlPlane;
use crate::schema::{HostComputeEndpoint, ModifyEndpointSettingRequest};

const MESSAGE: &str = "the Host Networking Service is only available on Windows";

/// Control plane that refuses every call.
///
/// Lets the workspace build and the CLI parse arguments on any host,
/// while making it obvious why nothing can be programmed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedControlPlane;

impl UnsupportedControlPlane {
    /// Creates a new unsupported control plane.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn refuse<T>(operation: &'static str) -> Result<T> {
        tracing::warn!(operation, "host networking unavailable on this platform");
        Err(HcnProxyError::ControlPlane {
            operation,
            message: MESSAGE.to_owned(),
        })
    }
}

impl ControlPlane for UnsupportedControlPlane {
    fn endpoint(&self, _id: &EndpointId) -> Result<HostComputeEndpoint> {
        Self::refuse("HcnQueryEndpointProperties")
    }

    fn modify_endpoint(
        &self,
        _id: &EndpointId,
        _request: &ModifyEndpointSettingRequest,
    ) -> Result<()> {
        Self::refuse("HcnModifyEndpoint")
    }

    fn namespace_endpoint_ids(&self, _namespace: &NamespaceId) -> Result<Vec<EndpointId>> {
        Self::refuse("HcnQueryNamespaceProperties")
    }

    fn is_available(&self) -> bool {
        false
    }
}
