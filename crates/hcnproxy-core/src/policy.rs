//! The layer-4 proxy policy record and its HNS representation.

use std::fmt;

use hcnproxy_common::constants::{LOCAL_SYSTEM_ALIAS, LOCAL_SYSTEM_SID, PROTOCOL_TCP};
use hcnproxy_common::error::{HcnProxyError, Result};
use hcnproxy_hcn::schema::{
    EndpointPolicy, EndpointPolicyType, FiveTuple, L4WfpProxyPolicySetting,
};
use serde::{Deserialize, Serialize};

/// Transport protocol intercepted by a policy. HNS only supports TCP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP (IANA protocol number 6).
    #[default]
    Tcp,
}

impl Protocol {
    /// Returns the IANA protocol number as HNS expects it.
    #[must_use]
    pub const fn as_hns(self) -> &'static str {
        match self {
            Self::Tcp => PROTOCOL_TCP,
        }
    }

    /// Parses an HNS protocol list. An empty list means TCP.
    fn from_hns(value: &str) -> Option<Self> {
        match value.trim() {
            "" | PROTOCOL_TCP => Some(Self::Tcp),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

/// A proxy policy: which traffic of an endpoint is redirected to which
/// local proxy port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Port the proxy is listening on. Required.
    pub proxy_port: String,
    /// Traffic originating from this user SID is not redirected.
    pub user_sid: Option<String>,
    /// Only redirect traffic originating from these addresses.
    pub local_addresses: Option<String>,
    /// Only redirect traffic destined to these addresses.
    pub remote_addresses: Option<String>,
    /// Only redirect traffic originating from this port or port range.
    pub local_ports: Option<String>,
    /// Only redirect traffic destined to this port or port range.
    pub remote_ports: Option<String>,
    /// WFP filter weight of the policy.
    ///
    /// See <https://docs.microsoft.com/en-us/windows/win32/fwp/filter-weight-assignment>.
    pub priority: u16,
    /// Protocol to intercept.
    pub protocol: Protocol,
}

impl Policy {
    /// Creates a policy redirecting all TCP traffic to `proxy_port`.
    #[must_use]
    pub fn new(proxy_port: impl Into<String>) -> Self {
        Self {
            proxy_port: proxy_port.into(),
            ..Self::default()
        }
    }

    /// Checks the policy before anything is sent to HNS.
    ///
    /// The proxy port must be a plain decimal number between 1 and 65535,
    /// without surrounding whitespace. Optional filters must be either unset
    /// or non-empty, since HNS does not distinguish an empty filter from an
    /// absent one.
    ///
    /// # Errors
    ///
    /// Returns [`HcnProxyError::InvalidPolicy`] if the proxy port is
    /// missing, not a port number, or zero, or if a filter is set to an
    /// empty string.
    pub fn validate(&self) -> Result<()> {
        let port = self.proxy_port.as_str();
        if port.is_empty() {
            return Err(HcnProxyError::invalid_policy("policy missing proxy port"));
        }
        match port.parse::<u16>() {
            Ok(0) => {
                return Err(HcnProxyError::invalid_policy(
                    "policy has invalid proxy port value: 0",
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(HcnProxyError::invalid_policy(format!(
                    "policy has invalid proxy port value {port:?}: {e}"
                )));
            }
        }
        for (name, value) in self.filters() {
            if value.is_some_and(str::is_empty) {
                return Err(HcnProxyError::invalid_policy(format!(
                    "policy {name} is empty; leave the filter unset instead"
                )));
            }
        }
        Ok(())
    }

    fn filters(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("user SID", self.user_sid.as_deref()),
            ("local addresses", self.local_addresses.as_deref()),
            ("remote addresses", self.remote_addresses.as_deref()),
            ("local ports", self.local_ports.as_deref()),
            ("remote ports", self.remote_ports.as_deref()),
        ]
    }

    /// Builds the HNS settings document of this policy. The protocol is
    /// always written as TCP.
    #[must_use]
    pub fn to_setting(&self) -> L4WfpProxyPolicySetting {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        L4WfpProxyPolicySetting {
            inbound_nat: false,
            port: self.proxy_port.clone(),
            user_sid: field(&self.user_sid),
            filter_tuple: FiveTuple {
                protocols: Protocol::Tcp.as_hns().to_owned(),
                local_addresses: field(&self.local_addresses),
                remote_addresses: field(&self.remote_addresses),
                local_ports: field(&self.local_ports),
                remote_ports: field(&self.remote_ports),
                priority: self.priority,
            },
        }
    }

    /// Wraps this policy in an `L4WFPPROXY` endpoint policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized.
    pub fn to_endpoint_policy(&self) -> Result<EndpointPolicy> {
        Ok(EndpointPolicy {
            kind: EndpointPolicyType::L4WfpProxy,
            settings: serde_json::to_value(self.to_setting())?,
        })
    }

    /// Rebuilds a policy from an HNS settings document.
    ///
    /// Returns `None` if the setting names a protocol other than TCP.
    #[must_use]
    pub fn from_setting(setting: L4WfpProxyPolicySetting) -> Option<Self> {
        let field = |value: String| Some(value).filter(|v| !v.is_empty());
        let tuple = setting.filter_tuple;
        Some(Self {
            protocol: Protocol::from_hns(&tuple.protocols)?,
            proxy_port: setting.port,
            user_sid: field(setting.user_sid),
            local_addresses: field(tuple.local_addresses),
            remote_addresses: field(tuple.remote_addresses),
            local_ports: field(tuple.local_ports),
            remote_ports: field(tuple.remote_ports),
            priority: tuple.priority,
        })
    }

    /// Decodes an endpoint policy reported by HNS.
    ///
    /// `index` is the position of the policy among the endpoint's proxy
    /// policies and only feeds the error message.
    ///
    /// # Errors
    ///
    /// Returns [`HcnProxyError::MalformedPolicy`] if the policy is not an
    /// `L4WFPPROXY` policy, its settings do not decode, or it targets a
    /// protocol other than TCP.
    pub fn from_endpoint_policy(index: usize, policy: &EndpointPolicy) -> Result<Self> {
        let malformed = |reason: String| HcnProxyError::MalformedPolicy { index, reason };
        if !policy.is_l4_proxy() {
            return Err(malformed(format!(
                "unexpected policy type {:?}",
                String::from(policy.kind.clone())
            )));
        }
        let setting = L4WfpProxyPolicySetting::deserialize(&policy.settings)
            .map_err(|e| malformed(e.to_string()))?;
        let protocols = setting.filter_tuple.protocols.clone();
        Self::from_setting(setting)
            .ok_or_else(|| malformed(format!("unsupported protocol {protocols:?}")))
    }
}

/// Maps the `system` alias to the Local System SID and passes any other
/// SID through.
#[must_use]
pub fn resolve_user_sid(sid: &str) -> String {
    if sid.eq_ignore_ascii_case(LOCAL_SYSTEM_ALIAS) {
        LOCAL_SYSTEM_SID.to_owned()
    } else {
        sid.to_owned()
    }
}
