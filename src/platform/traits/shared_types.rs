// ABOUTME: Data model shared by the platform traits.
// ABOUTME: RunSpecification, ContainerSpec, service descriptions and weighted target groups.

use crate::types::{RevisionId, TargetGroupId};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Describe-only fields the registration call rejects.
const READ_ONLY_FIELDS: &[&str] = &[
    "revision",
    "status",
    "compatibilities",
    "requiresAttributes",
    "registeredAt",
    "registeredBy",
    "deregisteredAt",
];

/// An immutable, versioned description of how to run a containerized workload.
///
/// Serializes to the shape the registration call accepts: the revision
/// identifier and other describe-only fields are never sent, and role
/// identities are omitted when absent so the platform does not read the
/// omission as "clear the role". Settings not modelled here (runtime
/// platform, ephemeral storage ...) are kept verbatim in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSpecification {
    #[serde(rename = "taskDefinitionArn", default, skip_serializing)]
    pub revision: Option<RevisionId>,

    pub family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    #[serde(rename = "containerDefinitions", default)]
    pub containers: Vec<ContainerSpec>,

    #[serde(default)]
    pub volumes: Vec<Volume>,

    #[serde(default)]
    pub placement_constraints: Vec<PlacementConstraint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,

    #[serde(default)]
    pub requires_compatibilities: Vec<String>,

    #[serde(flatten, serialize_with = "serialize_registrable")]
    pub settings: Map<String, Value>,
}

fn serialize_registrable<S: Serializer>(
    settings: &Map<String, Value>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        settings
            .iter()
            .filter(|(key, _)| !READ_ONLY_FIELDS.contains(&key.as_str())),
    )
}

impl RunSpecification {
    /// Find a container by exact, case-sensitive name.
    pub fn container(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Copy this specification with `image` applied to the container named
    /// `container`.
    ///
    /// The copy carries no revision identifier: it has not been registered.
    /// Returns `false` alongside an otherwise identical copy when no container
    /// has that name.
    pub fn with_container_image(&self, container: &str, image: &str) -> (RunSpecification, bool) {
        let mut next = self.clone();
        next.revision = None;

        let mut matched = false;
        for spec in next.containers.iter_mut().filter(|c| c.name == container) {
            spec.image = image.to_string();
            matched = true;
        }

        (next, matched)
    }
}

/// One container entry within a run specification.
///
/// Only `name` and `image` are interpreted; every other setting (ports,
/// environment, logging ...) is kept verbatim in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            settings: Map::new(),
        }
    }
}

/// A data volume declared by a run specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// A task placement constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// What the orchestrator reports about a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    /// Revision the service is currently bound to.
    pub current_revision: Option<RevisionId>,
    /// Lookup failures reported alongside the description.
    pub failures: Vec<PlatformFailure>,
}

/// A failure entry returned by a describe call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformFailure {
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl std::fmt::Display for PlatformFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.arn.as_deref().unwrap_or("<unknown>"),
            self.reason.as_deref().unwrap_or("unknown reason")
        )?;
        if let Some(ref detail) = self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Result of waiting for a service to stabilize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityOutcome {
    /// All desired tasks are running and healthy.
    Stable,
    /// The platform stopped waiting before the service stabilized.
    TimedOut,
}

/// A target group and the share of traffic it should receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTargetGroup {
    pub target_group: TargetGroupId,
    pub weight: u8,
}
