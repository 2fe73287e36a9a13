// ABOUTME: Cluster control-plane trait: services and run-specification revisions.
// ABOUTME: Describe, register, repoint, and wait for stabilization.

use super::shared_types::{RunSpecification, ServiceDescription, StabilityOutcome};
use crate::platform::PlatformError;
use crate::types::{ClusterName, RevisionId, ServiceName};
use async_trait::async_trait;

/// Operations against the cluster orchestrator.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Read the revision a service currently runs, plus any lookup failures.
    async fn describe_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<ServiceDescription, ClusterError>;

    /// Fetch the full run specification for a revision.
    async fn describe_run_specification(
        &self,
        revision: &RevisionId,
    ) -> Result<RunSpecification, ClusterError>;

    /// Register a specification as a new revision and return its identifier.
    async fn register_run_specification(
        &self,
        spec: &RunSpecification,
    ) -> Result<RevisionId, ClusterError>;

    /// Point a service at a revision.
    async fn update_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
        revision: &RevisionId,
    ) -> Result<(), ClusterError>;

    /// Block until the service is stable or the platform gives up.
    async fn wait_until_stable(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<StabilityOutcome, ClusterError>;
}

/// Errors from cluster operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("run specification not found: {0}")]
    RevisionNotFound(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("service failed to stabilize: {0}")]
    Unstable(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
