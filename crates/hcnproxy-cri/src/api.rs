//! Message types of the `runtime.v1` CRI API.
//!
//! Only the fields hcnproxy reads are declared. Tags match
//! `k8s.io/cri-api/pkg/apis/runtime/v1/api.proto`; fields not declared
//! here are skipped when decoding.

use std::collections::HashMap;

/// Fully qualified name of the CRI runtime service.
pub const RUNTIME_SERVICE: &str = "runtime.v1.RuntimeService";

/// Request of `RuntimeService/ListContainers`. An empty request lists
/// every container.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ListContainersRequest {}

/// Response of `RuntimeService/ListContainers`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ListContainersResponse {
    /// Containers known to the runtime.
    #[prost(message, repeated, tag = "1")]
    pub containers: Vec<Container>,
}

/// Metadata identifying a container within its sandbox.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ContainerMetadata {
    /// Container name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Restart attempt number.
    #[prost(uint32, tag = "2")]
    pub attempt: u32,
}

/// Lifecycle state of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ContainerState {
    /// Created but not started.
    ContainerCreated = 0,
    /// Running.
    ContainerRunning = 1,
    /// Exited.
    ContainerExited = 2,
    /// State unknown to the runtime.
    ContainerUnknown = 3,
}

/// A container as returned by `ListContainers`.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Container {
    /// Runtime-assigned container ID.
    #[prost(string, tag = "1")]
    pub id: String,
    /// ID of the sandbox the container belongs to.
    #[prost(string, tag = "2")]
    pub pod_sandbox_id: String,
    /// Container metadata.
    #[prost(message, optional, tag = "3")]
    pub metadata: Option<ContainerMetadata>,
    /// Lifecycle state.
    #[prost(enumeration = "ContainerState", tag = "6")]
    pub state: i32,
    /// Creation time, in nanoseconds since the epoch.
    #[prost(int64, tag = "7")]
    pub created_at: i64,
}

/// Request of `RuntimeService/ContainerStatus`.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ContainerStatusRequest {
    /// Container to inspect.
    #[prost(string, tag = "1")]
    pub container_id: String,
    /// Ask the runtime to populate the `info` map.
    #[prost(bool, tag = "2")]
    pub verbose: bool,
}

/// Status of a single container.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ContainerStatus {
    /// Container ID.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Container metadata.
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<ContainerMetadata>,
    /// Lifecycle state.
    #[prost(enumeration = "ContainerState", tag = "3")]
    pub state: i32,
}

/// Response of `RuntimeService/ContainerStatus`.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ContainerStatusResponse {
    /// Container status.
    #[prost(message, optional, tag = "1")]
    pub status: Option<ContainerStatus>,
    /// Runtime-specific details, populated when `verbose` is set. The
    /// `info` key holds a JSON document including the OCI runtime spec.
    #[prost(map = "string, string", tag = "2")]
    pub info: HashMap<String, String>,
}
