//! Tenant identity types.
//!
//! An [`OrganizationId`] is the only isolation key used for routing and storage
//! partitioning. It is always taken from call context, never from payload content.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when constructing an organization identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrganizationIdError {
    /// The identifier is empty or whitespace only.
    #[error("Organization ID cannot be empty")]
    Empty,
}

/// Opaque, non-empty identifier of a tenant organization.
///
/// # Example
///
/// ```
/// use shared::models::OrganizationId;
///
/// let org = OrganizationId::new("org-42").unwrap();
/// assert_eq!(org.as_str(), "org-42");
/// assert!(OrganizationId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Creates an organization identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationIdError::Empty`] if the value is empty or whitespace only.
    pub fn new(id: impl Into<String>) -> Result<Self, OrganizationIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(OrganizationIdError::Empty);
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrganizationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OrganizationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrganizationId {
    type Err = OrganizationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OrganizationId {
    type Error = OrganizationIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrganizationId> for String {
    fn from(id: OrganizationId) -> Self {
        id.0
    }
}

/// The three OTLP signal kinds handled by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Trace spans.
    Traces,
    /// Metric data points.
    Metrics,
    /// Log records.
    Logs,
}

impl SignalKind {
    /// All signal kinds, in a stable order.
    pub const ALL: [Self; 3] = [Self::Traces, Self::Metrics, Self::Logs];

    /// Returns the lowercase name of the signal kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Traces => "traces",
            Self::Metrics => "metrics",
            Self::Logs => "logs",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traces" => Ok(Self::Traces),
            "metrics" => Ok(Self::Metrics),
            "logs" => Ok(Self::Logs),
            other => Err(format!("unknown signal kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_id_rejects_empty() {
        assert_eq!(OrganizationId::new(""), Err(OrganizationIdError::Empty));
        assert_eq!(OrganizationId::new(" \t"), Err(OrganizationIdError::Empty));
    }

    #[test]
    fn test_organization_id_serializes_as_string() {
        let org = OrganizationId::new("org-1").unwrap();
        assert_eq!(serde_json::to_string(&org).unwrap(), "\"org-1\"");

        let parsed: OrganizationId = serde_json::from_str("\"org-2\"").unwrap();
        assert_eq!(parsed.as_str(), "org-2");
        assert!(serde_json::from_str::<OrganizationId>("\"\"").is_err());
    }

    #[test]
    fn test_signal_kind_round_trips_through_str() {
        for kind in SignalKind::ALL {
            assert_eq!(kind.as_str().parse::<SignalKind>().unwrap(), kind);
        }
        assert!("spans".parse::<SignalKind>().is_err());
    }
}
