// ABOUTME: Runs the release stages in order and folds the result into a report.
// ABOUTME: Stops at the first fatal error; checks for an abort between stages.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::platform::{ClusterOps, LoadBalancerOps};

use super::Deployment;
use super::cancel::Cancellation;
use super::error::{DeployError, DeployStage};
use super::outcome::{DeployOutcome, DeployReport};

/// Run discover, publish, stabilize and shift against the given collaborators.
///
/// Never returns an error: a failure becomes `DeployOutcome::Failed` with the
/// stage that produced it, and every warning collected before it is kept.
pub async fn run_release<C, L>(
    config: &Config,
    cluster: &C,
    load_balancer: &L,
    cancel: &mut Cancellation,
) -> DeployReport
where
    C: ClusterOps,
    L: LoadBalancerOps,
{
    let mut diagnostics = Diagnostics::default();
    let result = drive(config, cluster, load_balancer, &mut diagnostics, cancel).await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(stage = %e.stage(), "Release failed: {}", e);
            if let Some(split) = e.last_applied().filter(|_| e.leaves_split_traffic()) {
                tracing::error!(
                    green = split.green,
                    blue = split.blue,
                    "Traffic is split; manual remediation required"
                );
            }
            DeployOutcome::failed(e)
        }
    };

    DeployReport {
        outcome,
        warnings: diagnostics.into_warnings(),
    }
}

fn check_abort(cancel: &Cancellation, next: DeployStage) -> Result<(), DeployError> {
    if cancel.is_cancelled() {
        return Err(DeployError::aborted(next));
    }
    Ok(())
}

async fn drive<C, L>(
    config: &Config,
    cluster: &C,
    load_balancer: &L,
    diagnostics: &mut Diagnostics,
    cancel: &mut Cancellation,
) -> Result<DeployOutcome, DeployError>
where
    C: ClusterOps,
    L: LoadBalancerOps,
{
    tracing::info!(
        region = %config.region,
        cluster = %config.cluster,
        service = %config.service,
        "Starting release"
    );

    check_abort(cancel, DeployStage::Discovery)?;
    let deployment = Deployment::new(config).discover(cluster).await?;

    check_abort(cancel, DeployStage::Registration)?;
    let deployment = deployment.publish(cluster, diagnostics).await?;

    check_abort(cancel, DeployStage::ServiceUpdate)?;
    let deployment = deployment.stabilize(cluster, cancel).await?;

    check_abort(cancel, DeployStage::ShiftPrecheck)?;
    let deployment = deployment
        .shift_traffic(load_balancer, diagnostics, cancel)
        .await?;

    let outcome = deployment.finish();
    match &outcome {
        DeployOutcome::Completed { revision, shift } => tracing::info!(
            revision = %revision,
            steps = shift.steps_applied,
            "Release completed; traffic on green"
        ),
        DeployOutcome::CompletedNoShift { revision } => tracing::info!(
            revision = %revision,
            "Release completed without traffic shift"
        ),
        DeployOutcome::Failed { .. } => {}
    }
    Ok(outcome)
}
