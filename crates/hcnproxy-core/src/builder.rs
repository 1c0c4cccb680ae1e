//! Fluent API for configuring proxy policies.

use hcnproxy_common::error::Result;

use crate::policy::{Policy, resolve_user_sid};

/// Builder for a [`Policy`].
///
/// Empty filter values are treated as "not set", so values coming straight
/// from optional command-line flags can be passed through unchanged.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    policy: Policy,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|v| !v.is_empty())
}

impl PolicyBuilder {
    /// Creates a builder for a policy redirecting to `proxy_port`.
    #[must_use]
    pub fn new(proxy_port: impl Into<String>) -> Self {
        Self {
            policy: Policy::new(proxy_port),
        }
    }

    /// Exempts traffic originating from `sid`. `system` stands for the
    /// Local System account.
    #[must_use]
    pub fn user_sid(mut self, sid: impl AsRef<str>) -> Self {
        self.policy.user_sid = non_empty(resolve_user_sid(sid.as_ref()));
        self
    }

    /// Only redirects traffic originating from `addresses`.
    #[must_use]
    pub fn local_addresses(mut self, addresses: impl Into<String>) -> Self {
        self.policy.local_addresses = non_empty(addresses);
        self
    }

    /// Only redirects traffic destined to `addresses`.
    #[must_use]
    pub fn remote_addresses(mut self, addresses: impl Into<String>) -> Self {
        self.policy.remote_addresses = non_empty(addresses);
        self
    }

    /// Only redirects traffic originating from this port or port range.
    #[must_use]
    pub fn local_ports(mut self, ports: impl Into<String>) -> Self {
        self.policy.local_ports = non_empty(ports);
        self
    }

    /// Only redirects traffic destined to this port or port range.
    #[must_use]
    pub fn remote_ports(mut self, ports: impl Into<String>) -> Self {
        self.policy.remote_ports = non_empty(ports);
        self
    }

    /// Sets the filter weight.
    #[must_use]
    pub const fn priority(mut self, priority: u16) -> Self {
        self.policy.priority = priority;
        self
    }

    /// Validates and returns the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy port is missing or invalid.
    pub fn build(self) -> Result<Policy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
