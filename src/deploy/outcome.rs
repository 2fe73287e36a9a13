// ABOUTME: Terminal status of a release and the report returned to the caller.
// ABOUTME: Maps outcomes to process exit codes.

use crate::diagnostics::Warning;
use crate::types::RevisionId;

use super::error::{DeployError, DeployErrorKind, DeployStage};
use super::traffic::ShiftSummary;

/// How a release ended. There is no partial success.
#[derive(Debug)]
pub enum DeployOutcome {
    /// Revision applied, service stable, traffic fully on green.
    Completed {
        revision: RevisionId,
        shift: ShiftSummary,
    },

    /// Revision applied and service stable; shifting was skipped.
    CompletedNoShift { revision: RevisionId },

    /// A stage reported a fatal error. Later stages never ran.
    Failed {
        stage: DeployStage,
        cause: DeployError,
    },
}

impl DeployOutcome {
    pub fn failed(cause: DeployError) -> Self {
        DeployOutcome::Failed {
            stage: cause.stage(),
            cause,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, DeployOutcome::Failed { .. })
    }

    /// The revision the service runs after a successful release.
    pub fn revision(&self) -> Option<&RevisionId> {
        match self {
            DeployOutcome::Completed { revision, .. }
            | DeployOutcome::CompletedNoShift { revision } => Some(revision),
            DeployOutcome::Failed { .. } => None,
        }
    }

    /// 0 on success, 130 when aborted, 1 on any other failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployOutcome::Completed { .. } | DeployOutcome::CompletedNoShift { .. } => 0,
            DeployOutcome::Failed { cause, .. } if cause.kind() == DeployErrorKind::Aborted => 130,
            DeployOutcome::Failed { .. } => 1,
        }
    }
}

/// Outcome plus every warning collected on the way.
#[derive(Debug)]
pub struct DeployReport {
    pub outcome: DeployOutcome,
    pub warnings: Vec<Warning>,
}
