//! Unified error type for the hcnproxy workspace.
//!
//! Two broad families exist: validation errors, raised before any remote
//! call is made, and errors propagated from the host networking control
//! plane or the container runtime.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum HcnProxyError {
    /// A proxy policy failed local validation.
    #[error("invalid policy: {message}")]
    InvalidPolicy {
        /// Description of the validation failure.
        message: String,
    },

    /// A caller-supplied argument (identifier, address) is malformed.
    #[error("invalid {what}: {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        what: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The container exists but its status carries no network namespace.
    #[error("container {container} has no network namespace in its runtime status")]
    MissingNamespace {
        /// Container that was inspected.
        container: String,
    },

    /// The namespace exists but no endpoint is attached to it.
    #[error("could not find an endpoint attached to namespace {namespace}")]
    NoEndpoints {
        /// Namespace that was queried.
        namespace: String,
    },

    /// The control plane returned a proxy policy that cannot be decoded.
    #[error("malformed proxy policy at index {index}: {reason}")]
    MalformedPolicy {
        /// Position of the policy among the endpoint's proxy policies.
        index: usize,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A host networking control plane call failed.
    #[error("host networking call {operation} failed: {message}")]
    ControlPlane {
        /// Name of the failed call.
        operation: &'static str,
        /// Description returned by the control plane.
        message: String,
    },

    /// A container runtime call failed.
    #[error("container runtime call {operation} failed: {message}")]
    Runtime {
        /// Name of the failed call.
        operation: &'static str,
        /// Description returned by the runtime or transport.
        message: String,
    },

    /// The bulk removal of proxy policies failed.
    #[error("failed to remove {attempted} proxy policies: {source}")]
    ClearFailed {
        /// Number of policies targeted by the removal.
        attempted: usize,
        /// Underlying failure.
        source: Box<HcnProxyError>,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl HcnProxyError {
    /// Returns `true` if this error was raised by local validation rather
    /// than propagated from a remote call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPolicy { .. } | Self::InvalidArgument { .. })
    }

    /// Returns the number of policies a failed clear targeted, if any.
    #[must_use]
    pub const fn attempted(&self) -> Option<usize> {
        match self {
            Self::ClearFailed { attempted, .. } => Some(*attempted),
            _ => None,
        }
    }

    /// Builds an [`HcnProxyError::InvalidPolicy`] from a message.
    #[must_use]
    pub fn invalid_policy(message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HcnProxyError>;
