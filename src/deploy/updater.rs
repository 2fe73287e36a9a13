// ABOUTME: Repoints a service at a revision and waits for it to stabilize.
// ABOUTME: The wait is bounded by the configured timeout and interruptible by abort.

use crate::config::Config;
use crate::platform::{ClusterError, ClusterOps, StabilityOutcome};
use crate::types::RevisionId;

use super::cancel::Cancellation;
use super::error::{ClusterErrorExt, DeployError, DeployStage};

/// What the updater did to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceUpdate {
    /// Target equals the current revision; no call was made.
    Unchanged,
    /// The service was repointed and reported stable.
    Repointed,
}

/// Point the service at `target` and block until it is stable.
///
/// Once the update call succeeds the service is repointed whatever the wait
/// returns. A failed wait does not move it back.
///
/// # Errors
///
/// - `DeployError::ServiceUpdate` if the repoint request fails
/// - `DeployError::StabilizationTimeout` if neither the platform nor the
///   configured bound sees a stable service
/// - `DeployError::StabilizationFailed` if the platform reports the rollout failed
/// - `DeployError::Aborted` if `cancel` fires during the wait
pub async fn update_and_wait<C: ClusterOps>(
    cluster: &C,
    config: &Config,
    current: &RevisionId,
    target: &RevisionId,
    cancel: &mut Cancellation,
) -> Result<ServiceUpdate, DeployError> {
    if target == current {
        tracing::info!(revision = %target, "Service revision unchanged; skipping update");
        return Ok(ServiceUpdate::Unchanged);
    }

    cluster
        .update_service(&config.cluster, &config.service, target)
        .await
        .context_service_update(target)?;

    tracing::info!(
        service = %config.service,
        revision = %target,
        timeout_secs = config.stabilization_timeout.as_secs(),
        "Service updated; waiting for stabilization"
    );

    // TODO: offer an opt-in revert to `current` when stabilization fails.
    let waited = cancel
        .guard(tokio::time::timeout(
            config.stabilization_timeout,
            cluster.wait_until_stable(&config.cluster, &config.service),
        ))
        .await;

    match waited {
        Err(_) => Err(DeployError::aborted(DeployStage::Stabilization)),
        Ok(Err(_elapsed)) => Err(DeployError::StabilizationTimeout(format!(
            "{} not stable after {}s",
            config.service,
            config.stabilization_timeout.as_secs()
        ))),
        Ok(Ok(Ok(StabilityOutcome::Stable))) => {
            tracing::info!(service = %config.service, "Service is stable");
            Ok(ServiceUpdate::Repointed)
        }
        Ok(Ok(Ok(StabilityOutcome::TimedOut))) => Err(DeployError::StabilizationTimeout(format!(
            "platform stopped waiting for {}",
            config.service
        ))),
        Ok(Ok(Err(ClusterError::Unstable(reason)))) => {
            Err(DeployError::StabilizationFailed(reason))
        }
        Ok(Ok(Err(e))) => Err(DeployError::StabilizationFailed(e.to_string())),
    }
}
