//! Configuration model for runtime lookups.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RUNTIME_ENDPOINT};

/// Root configuration for hcnproxy.
///
/// Policy operations need no configuration; only the container lookup
/// path talks to a configurable service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcnProxyConfig {
    /// Address of the CRI runtime endpoint.
    pub runtime_endpoint: String,
    /// Connect timeout for the runtime endpoint.
    pub connect_timeout: Duration,
}

impl HcnProxyConfig {
    /// Returns a copy of `self` with the runtime endpoint replaced when
    /// `endpoint` is set and non-empty.
    #[must_use]
    pub fn with_runtime_endpoint(mut self, endpoint: Option<&str>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.runtime_endpoint = endpoint.to_owned();
        }
        self
    }
}

impl Default for HcnProxyConfig {
    fn default() -> Self {
        Self {
            runtime_endpoint: DEFAULT_RUNTIME_ENDPOINT.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}
