// ABOUTME: Error types for release stages.
// ABOUTME: One variant per fatal failure class, each tied to the stage it aborts.

use std::fmt;

use crate::platform::ClusterError;
use crate::types::RevisionId;

use super::traffic::WeightSplit;

/// The pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    /// Reading the service and its current run specification.
    Discovery,
    /// Registering the new revision.
    Registration,
    /// Repointing the service at the new revision.
    ServiceUpdate,
    /// Waiting for the service to become stable.
    Stabilization,
    /// Checking the listener before any weight is changed.
    ShiftPrecheck,
    /// Writing weights to the listener.
    ShiftStep,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::Discovery => "discovery",
            DeployStage::Registration => "registration",
            DeployStage::ServiceUpdate => "service update",
            DeployStage::Stabilization => "stabilization",
            DeployStage::ShiftPrecheck => "shift precheck",
            DeployStage::ShiftStep => "traffic shift",
        };
        f.write_str(name)
    }
}

/// Errors that abort a release.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The service or its run specification could not be read.
    #[error("service discovery failed: {0}")]
    Discovery(String),

    /// The new revision was rejected. Nothing external has changed.
    #[error("failed to register new revision: {0}")]
    Registration(String),

    /// The repoint request itself failed.
    #[error("failed to update service to {revision}: {reason}")]
    ServiceUpdate { revision: RevisionId, reason: String },

    /// The service never reported a stable state.
    #[error("service did not stabilize: {0}")]
    StabilizationTimeout(String),

    /// The platform reported the rollout as failed.
    #[error("service failed to stabilize: {0}")]
    StabilizationFailed(String),

    /// The listener is unreachable or the shift inputs are unusable.
    /// Traffic is untouched.
    #[error("traffic shift precheck failed: {0}")]
    ShiftPrecheck(String),

    /// A weight write failed part-way. Traffic stays at `last_applied`.
    #[error("traffic shift failed at step {step}/{steps} ({}): {reason}", describe_split(.last_applied))]
    ShiftStep {
        step: u32,
        steps: u32,
        last_applied: Option<WeightSplit>,
        reason: String,
    },

    /// An operator abort interrupted the release.
    #[error("release aborted during {stage} ({})", describe_split(.last_applied))]
    Aborted {
        stage: DeployStage,
        last_applied: Option<WeightSplit>,
    },
}

fn describe_split(split: &Option<WeightSplit>) -> String {
    match split {
        Some(split) => format!("traffic left at {split}"),
        None => "no weights changed".to_string(),
    }
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Discovery,
    Registration,
    ServiceUpdate,
    Stabilization,
    ShiftPrecheck,
    ShiftStep,
    Aborted,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Discovery(_) => DeployErrorKind::Discovery,
            DeployError::Registration(_) => DeployErrorKind::Registration,
            DeployError::ServiceUpdate { .. } => DeployErrorKind::ServiceUpdate,
            DeployError::StabilizationTimeout(_) | DeployError::StabilizationFailed(_) => {
                DeployErrorKind::Stabilization
            }
            DeployError::ShiftPrecheck(_) => DeployErrorKind::ShiftPrecheck,
            DeployError::ShiftStep { .. } => DeployErrorKind::ShiftStep,
            DeployError::Aborted { .. } => DeployErrorKind::Aborted,
        }
    }

    /// The stage that was running when this error occurred.
    pub fn stage(&self) -> DeployStage {
        match self {
            DeployError::Discovery(_) => DeployStage::Discovery,
            DeployError::Registration(_) => DeployStage::Registration,
            DeployError::ServiceUpdate { .. } => DeployStage::ServiceUpdate,
            DeployError::StabilizationTimeout(_) | DeployError::StabilizationFailed(_) => {
                DeployStage::Stabilization
            }
            DeployError::ShiftPrecheck(_) => DeployStage::ShiftPrecheck,
            DeployError::ShiftStep { .. } => DeployStage::ShiftStep,
            DeployError::Aborted { stage, .. } => *stage,
        }
    }

    /// Weights last written before the failure, when a shift had started.
    pub fn last_applied(&self) -> Option<WeightSplit> {
        match self {
            DeployError::ShiftStep { last_applied, .. } | DeployError::Aborted { last_applied, .. } => {
                *last_applied
            }
            _ => None,
        }
    }

    /// Whether traffic may be split between blue and green.
    pub fn leaves_split_traffic(&self) -> bool {
        self.last_applied().is_some_and(|split| split.blue > 0)
    }

    pub fn aborted(stage: DeployStage) -> Self {
        DeployError::Aborted {
            stage,
            last_applied: None,
        }
    }
}

/// Attach stage context to cluster errors.
pub trait ClusterErrorExt<T> {
    /// Map to a discovery failure.
    fn context_discovery(self) -> Result<T, DeployError>;
    /// Map to a registration failure.
    fn context_registration(self) -> Result<T, DeployError>;
    /// Map to a service update failure for `revision`.
    fn context_service_update(self, revision: &RevisionId) -> Result<T, DeployError>;
}

impl<T> ClusterErrorExt<T> for Result<T, ClusterError> {
    fn context_discovery(self) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::Discovery(e.to_string()))
    }

    fn context_registration(self) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::Registration(e.to_string()))
    }

    fn context_service_update(self, revision: &RevisionId) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::ServiceUpdate {
            revision: revision.clone(),
            reason: e.to_string(),
        })
    }
}
