//! Domain types for service plan categorization.
//!
//! This module contains the node/edge model of the milestone and task
//! dependency graph, the closed [`ServicePlan`] lattice, and the provenance
//! records that make up a service's audit trail.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name reported for milestones and tasks that carry no `name` field.
pub const UNNAMED: &str = "N/A";

/// Stable external identifier of a milestone or task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arn(pub String);

impl Arn {
    /// Create a new arn
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Get the arn as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Arn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Arn {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Arn {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a service, e.g. `ec2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub String);

impl ServiceId {
    /// Create a new service ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the service ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Launch-readiness plan of a service.
///
/// Variants are declared lowest precedence first, so the derived [`Ord`]
/// is the precedence order:
/// `Uncategorized < NonGlobal < Mandatory < LaunchBlocking`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServicePlan {
    /// No categorizing evidence was found
    #[default]
    Uncategorized,

    /// The service does not expand to every region
    NonGlobal,

    /// The service must launch in every region, but does not gate launches
    Mandatory,

    /// The service gates every region launch
    LaunchBlocking,
}

impl ServicePlan {
    /// All plans, highest precedence first.
    pub const ALL: [ServicePlan; 4] = [
        ServicePlan::LaunchBlocking,
        ServicePlan::Mandatory,
        ServicePlan::NonGlobal,
        ServicePlan::Uncategorized,
    ];

    /// The label used by the categorization-record store.
    pub fn label(self) -> &'static str {
        match self {
            Self::LaunchBlocking => "Globally Expanding - Launch Blocking",
            Self::Mandatory => "Globally Expanding - Mandatory",
            Self::NonGlobal => "Non-Globally Expanding",
            Self::Uncategorized => "UNCATEGORIZED",
        }
    }

    /// The enum token, e.g. `LAUNCH_BLOCKING`.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::LaunchBlocking => "LAUNCH_BLOCKING",
            Self::Mandatory => "MANDATORY",
            Self::NonGlobal => "NON_GLOBAL",
            Self::Uncategorized => "UNCATEGORIZED",
        }
    }
}

impl fmt::Display for ServicePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// A plan string that is neither a store label nor an enum token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service plan: {0:?}")]
pub struct ParsePlanError(pub String);

impl FromStr for ServicePlan {
    type Err = ParsePlanError;

    /// Accepts store labels and enum tokens. The store clears a plan by
    /// writing an empty string, so `""` parses as `Uncategorized`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Uncategorized);
        }
        Self::ALL
            .into_iter()
            .find(|plan| plan.label() == s || plan.as_token().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePlanError(s.to_string()))
    }
}

/// A milestone or task record as listed by the upstream data source.
///
/// `service` and `name` are resolved into typed fields; every other key is
/// kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable identifier
    pub arn: Arn,

    /// Owning service, absent for purely structural milestones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceId>,

    /// Human label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remaining upstream fields (status, dimension, ...)
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NodeRecord {
    /// Create a record with no service, name, or metadata
    pub fn new(arn: impl Into<Arn>) -> Self {
        Self {
            arn: arn.into(),
            service: None,
            name: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set the owning service
    #[must_use]
    pub fn with_service(mut self, service: impl Into<ServiceId>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the human label
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The owning service. An empty `service` field counts as absent.
    pub fn service(&self) -> Option<&ServiceId> {
        self.service.as_ref().filter(|s| !s.as_str().is_empty())
    }

    /// The human label, or [`UNNAMED`].
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

/// A predecessor -> successor relationship as listed by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    /// Identifier of the edge itself, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Predecessor
    pub from: Arn,

    /// Successor
    pub to: Arn,
}

impl RawEdge {
    /// Create an edge without an identifier
    pub fn new(from: impl Into<Arn>, to: impl Into<Arn>) -> Self {
        Self {
            arn: None,
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A milestone or task placed in the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The upstream record
    pub record: NodeRecord,

    /// Plan of the owning service at graph-build time.
    ///
    /// `None` when the node has no owning service.
    pub service_plan: Option<ServicePlan>,
}

impl Node {
    /// The node's arn
    pub fn arn(&self) -> &Arn {
        &self.record.arn
    }

    /// The owning service, if any
    pub fn service(&self) -> Option<&ServiceId> {
        self.record.service()
    }

    /// The human label, or [`UNNAMED`]
    pub fn name(&self) -> &str {
        self.record.name()
    }
}

/// One hop of a service's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// The successor that was visited
    pub node: NodeRecord,

    /// The category this successor contributed
    pub category: ServicePlan,

    /// The arn the successor was reached from
    pub predecessor: Arn,
}
