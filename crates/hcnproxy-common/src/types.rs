//! Domain identifier types used across the hcnproxy workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HcnProxyError;

/// Identifier of an endpoint inside the host networking control plane.
///
/// Endpoint IDs are GUIDs (for example the ones printed by `hnsdiag`).
/// The textual form given by the caller is kept as-is so it can be echoed
/// back unchanged. Every constructor, deserialization included, checks the
/// GUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointId {
    raw: String,
    guid: Uuid,
}

impl EndpointId {
    /// Parses an endpoint ID, rejecting anything that is not a GUID.
    ///
    /// # Errors
    ///
    /// Returns [`HcnProxyError::InvalidArgument`] if the value is not a GUID.
    pub fn parse(id: impl Into<String>) -> crate::error::Result<Self> {
        let raw = id.into();
        let trimmed = raw.trim_start_matches('{').trim_end_matches('}');
        match Uuid::parse_str(trimmed) {
            Ok(guid) => Ok(Self { raw, guid }),
            Err(e) => Err(HcnProxyError::InvalidArgument {
                what: "endpoint id",
                message: format!("{raw:?} is not a GUID: {e}"),
            }),
        }
    }

    /// Returns the GUID value of this ID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.guid
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for EndpointId {
    type Error = HcnProxyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EndpointId> for String {
    fn from(value: EndpointId) -> Self {
        value.raw
    }
}

impl FromStr for EndpointId {
    type Err = HcnProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Identifier of a container as reported by the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a network namespace (compartment) in the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(String);

impl NamespaceId {
    /// Creates a new namespace ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_id_accepts_guid() {
        let id = EndpointId::parse("5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10").unwrap();
        assert_eq!(id.as_str(), "5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10");
        assert_eq!(
            id.uuid().to_string(),
            "5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10"
        );
    }

    #[test]
    fn endpoint_id_accepts_braced_guid() {
        let id = EndpointId::parse("{5E3BD1D4-0C64-4C37-9A1F-6A3A3F4B2C10}").unwrap();
        assert_eq!(
            id.uuid().to_string(),
            "5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10"
        );
    }

    #[test]
    fn endpoint_id_rejects_garbage() {
        let err = EndpointId::parse("not-an-endpoint").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn endpoint_id_deserialization_checks_guid() {
        let id: EndpointId =
            serde_json::from_str(r#""5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10""#).unwrap();
        assert_eq!(id.uuid().as_u128(), 0x5e3b_d1d4_0c64_4c37_9a1f_6a3a_3f4b_2c10);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            r#""5e3bd1d4-0c64-4c37-9a1f-6a3a3f4b2c10""#
        );

        let err = serde_json::from_str::<EndpointId>(r#""eth0""#).unwrap_err();
        assert!(err.to_string().contains("not a GUID"));
    }

    #[test]
    fn container_id_display_matches_input() {
        assert_eq!(ContainerId::new("abc123").to_string(), "abc123");
    }
}
