//! Native control plane over the Host Compute Network API.
//!
//! Every call opens a handle on the target object, performs one query or
//! modification, and closes the handle when it goes out of scope. Strings
//! returned by `computenetwork.dll` are allocated with `CoTaskMemAlloc`
//! and freed here after being copied.

use std::ffi::c_void;

use ::windows::Win32::Foundation::ERROR_NOT_FOUND;
use ::windows::Win32::System::Com::CoTaskMemFree;
use ::windows::Win32::System::HostComputeNetwork::{
    HcnCloseEndpoint, HcnCloseNamespace, HcnModifyEndpoint, HcnOpenEndpoint, HcnOpenNamespace,
    HcnQueryEndpointProperties, HcnQueryNamespaceProperties,
};
use ::windows::core::{GUID, HRESULT, HSTRING, PWSTR};
use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_common::types::{EndpointId, NamespaceId};
use uuid::Uuid;

use super::ControlPlane;
use crate::schema::{
    HostComputeEndpoint, HostComputeNamespace, HostComputeQuery, ModifyEndpointSettingRequest,
};

/// `HCN_E_NETWORK_NOT_FOUND` from `winerror.h`.
#[allow(clippy::cast_possible_wrap)]
const HCN_E_NETWORK_NOT_FOUND: HRESULT = HRESULT(0x803B_0001_u32 as i32);

/// `HCN_E_ENDPOINT_NOT_FOUND` from `winerror.h`.
#[allow(clippy::cast_possible_wrap)]
const HCN_E_ENDPOINT_NOT_FOUND: HRESULT = HRESULT(0x803B_0002_u32 as i32);

/// Control plane backed by `computenetwork.dll`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HcnControlPlane;

impl HcnControlPlane {
    /// Creates a new native control plane.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ControlPlane for HcnControlPlane {
    fn endpoint(&self, id: &EndpointId) -> Result<HostComputeEndpoint> {
        let handle = EndpointHandle::open(id)?;
        let query = HSTRING::from(HostComputeQuery::default().to_json()?);
        let mut properties = PWSTR::null();
        let mut record = PWSTR::null();
        // SAFETY: the handle is open for the lifetime of `handle`, and both
        // out-pointers refer to live locals.
        let result = unsafe {
            HcnQueryEndpointProperties(handle.0, &query, &mut properties, Some(&mut record))
        };
        let properties = take_string(properties);
        check("HcnQueryEndpointProperties", result, record, ("endpoint", id.as_str()))?;
        let properties = properties.unwrap_or_default();
        tracing::trace!(endpoint = %id, %properties, "queried endpoint");
        Ok(serde_json::from_str(&properties)?)
    }

    fn modify_endpoint(
        &self,
        id: &EndpointId,
        request: &ModifyEndpointSettingRequest,
    ) -> Result<()> {
        let handle = EndpointHandle::open(id)?;
        let settings = HSTRING::from(serde_json::to_string(request)?);
        let mut record = PWSTR::null();
        // SAFETY: the handle is open and the settings string outlives the call.
        let result = unsafe { HcnModifyEndpoint(handle.0, &settings, Some(&mut record)) };
        check("HcnModifyEndpoint", result, record, ("endpoint", id.as_str()))
    }

    fn namespace_endpoint_ids(&self, namespace: &NamespaceId) -> Result<Vec<EndpointId>> {
        let handle = NamespaceHandle::open(namespace)?;
        let query = HSTRING::from(HostComputeQuery::default().to_json()?);
        let mut properties = PWSTR::null();
        let mut record = PWSTR::null();
        // SAFETY: the handle is open for the lifetime of `handle`, and both
        // out-pointers refer to live locals.
        let result = unsafe {
            HcnQueryNamespaceProperties(handle.0, &query, &mut properties, Some(&mut record))
        };
        let properties = take_string(properties);
        check(
            "HcnQueryNamespaceProperties",
            result,
            record,
            ("namespace", namespace.as_str()),
        )?;
        let namespace: HostComputeNamespace =
            serde_json::from_str(&properties.unwrap_or_default())?;
        namespace.endpoint_ids()
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct EndpointHandle(*mut c_void);

impl EndpointHandle {
    fn open(id: &EndpointId) -> Result<Self> {
        let guid = GUID::from_u128(id.uuid().as_u128());
        let mut handle = std::ptr::null_mut();
        let mut record = PWSTR::null();
        // SAFETY: `guid`, `handle` and `record` are live locals.
        let result = unsafe { HcnOpenEndpoint(&guid, &mut handle, Some(&mut record)) };
        check("HcnOpenEndpoint", result, record, ("endpoint", id.as_str()))?;
        Ok(Self(handle))
    }
}

impl Drop for EndpointHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by a successful HcnOpenEndpoint.
        if let Err(e) = unsafe { HcnCloseEndpoint(self.0) } {
            tracing::debug!(error = %e, "failed to close endpoint handle");
        }
    }
}

struct NamespaceHandle(*mut c_void);

impl NamespaceHandle {
    fn open(id: &NamespaceId) -> Result<Self> {
        let trimmed = id.as_str().trim_start_matches('{').trim_end_matches('}');
        let uuid = Uuid::parse_str(trimmed).map_err(|e| HcnProxyError::InvalidArgument {
            what: "namespace id",
            message: format!("{id} is not a GUID: {e}"),
        })?;
        let guid = GUID::from_u128(uuid.as_u128());
        let mut handle = std::ptr::null_mut();
        let mut record = PWSTR::null();
        // SAFETY: `guid`, `handle` and `record` are live locals.
        let result = unsafe { HcnOpenNamespace(&guid, &mut handle, Some(&mut record)) };
        check("HcnOpenNamespace", result, record, ("namespace", id.as_str()))?;
        Ok(Self(handle))
    }
}

impl Drop for NamespaceHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by a successful HcnOpenNamespace.
        if let Err(e) = unsafe { HcnCloseNamespace(self.0) } {
            tracing::debug!(error = %e, "failed to close namespace handle");
        }
    }
}

/// Copies a string returned by HCN and frees the original.
fn take_string(value: PWSTR) -> Option<String> {
    if value.is_null() {
        return None;
    }
    // SAFETY: HCN returns NUL-terminated UTF-16 strings it allocated with
    // CoTaskMemAlloc; the pointer is not used after being freed.
    unsafe {
        let copied = value.to_string().ok();
        CoTaskMemFree(Some(value.0 as *const c_void));
        copied
    }
}

/// Returns `true` for the codes HNS uses to report a missing object.
///
/// Namespaces have no dedicated code and come back as `ERROR_NOT_FOUND`.
fn is_not_found(code: HRESULT) -> bool {
    code == ERROR_NOT_FOUND.to_hresult()
        || code == HCN_E_ENDPOINT_NOT_FOUND
        || code == HCN_E_NETWORK_NOT_FOUND
}

/// Turns an HCN result and its error record into a workspace error.
fn check(
    operation: &'static str,
    result: ::windows::core::Result<()>,
    record: PWSTR,
    (kind, id): (&'static str, &str),
) -> Result<()> {
    let record = take_string(record);
    result.map_err(|e| {
        if is_not_found(e.code()) {
            return HcnProxyError::NotFound {
                kind,
                id: id.to_owned(),
            };
        }
        let mut message = format!("{} (HRESULT {:#010x})", e.message(), e.code().0);
        if let Some(record) = record.filter(|r| !r.is_empty()) {
            message.push_str(": ");
            message.push_str(&record);
        }
        tracing::debug!(operation, %message, "control plane call failed");
        HcnProxyError::ControlPlane { operation, message }
    })
}
