// ABOUTME: State transition methods for release orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::{ClusterOps, LoadBalancerOps};

use super::Deployment;
use super::cancel::Cancellation;
use super::error::{ClusterErrorExt, DeployError};
use super::outcome::DeployOutcome;
use super::publisher::publish_revision;
use super::state::{Completed, Discovered, Initialized, Published, Stabilized};
use super::strategy::TrafficStrategy;
use super::traffic::{self, TrafficWeightPlan};
use super::updater::update_and_wait;

impl<'a, S> Deployment<'a, S> {
    /// Internal helper to move to the next state.
    fn transition<T>(self, state: T) -> Deployment<'a, T> {
        Deployment {
            config: self.config,
            state,
        }
    }
}

// =============================================================================
// Initialized -> Discovered
// =============================================================================

impl<'a> Deployment<'a, Initialized> {
    pub fn new(config: &'a Config) -> Self {
        Deployment {
            config,
            state: Initialized,
        }
    }

    /// Read the revision the service currently runs.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Discovery` if the describe call fails, reports
    /// failures, or the service has no current revision.
    #[must_use = "deployment state must be used"]
    pub async fn discover<C: ClusterOps>(
        self,
        cluster: &C,
    ) -> Result<Deployment<'a, Discovered>, DeployError> {
        let description = cluster
            .describe_service(&self.config.cluster, &self.config.service)
            .await
            .context_discovery()?;

        if !description.failures.is_empty() {
            let failures: Vec<String> = description
                .failures
                .iter()
                .map(ToString::to_string)
                .collect();
            return Err(DeployError::Discovery(failures.join("; ")));
        }

        let current = description.current_revision.ok_or_else(|| {
            DeployError::Discovery(format!(
                "service {} has no current revision",
                self.config.service
            ))
        })?;

        tracing::info!(
            cluster = %self.config.cluster,
            service = %self.config.service,
            revision = %current,
            "Discovered current revision"
        );
        Ok(self.transition(Discovered { current }))
    }
}

// =============================================================================
// Discovered -> Published
// =============================================================================

impl<'a> Deployment<'a, Discovered> {
    /// Choose the target revision, registering one if an override applies.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Discovery` or `DeployError::Registration`.
    #[must_use = "deployment state must be used"]
    pub async fn publish<C: ClusterOps>(
        self,
        cluster: &C,
        diagnostics: &mut Diagnostics,
    ) -> Result<Deployment<'a, Published>, DeployError> {
        let target = publish_revision(
            cluster,
            &self.state.current,
            self.config.image.as_ref(),
            self.config.container.as_deref(),
            diagnostics,
        )
        .await?;

        let current = self.state.current.clone();
        Ok(self.transition(Published { current, target }))
    }
}

// =============================================================================
// Published -> Stabilized
// =============================================================================

impl<'a> Deployment<'a, Published> {
    /// Repoint the service and wait until it is stable.
    ///
    /// # Errors
    ///
    /// Returns the updater's error. The service may already be repointed.
    #[must_use = "deployment state must be used"]
    pub async fn stabilize<C: ClusterOps>(
        self,
        cluster: &C,
        cancel: &mut Cancellation,
    ) -> Result<Deployment<'a, Stabilized>, DeployError> {
        let update = update_and_wait(
            cluster,
            self.config,
            &self.state.current,
            &self.state.target,
            cancel,
        )
        .await?;

        let revision = self.state.target.clone();
        Ok(self.transition(Stabilized { revision, update }))
    }
}

// =============================================================================
// Stabilized -> Completed
// =============================================================================

impl<'a> Deployment<'a, Stabilized> {
    /// Move traffic to green, or skip when the shift is not configured.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::ShiftPrecheck`, `DeployError::ShiftStep` or
    /// `DeployError::Aborted`.
    #[must_use = "deployment state must be used"]
    pub async fn shift_traffic<L: LoadBalancerOps>(
        self,
        load_balancer: &L,
        diagnostics: &mut Diagnostics,
        cancel: &mut Cancellation,
    ) -> Result<Deployment<'a, Completed>, DeployError> {
        let (strategy, reason) = TrafficStrategy::for_config(self.config);

        let shifted = match strategy {
            TrafficStrategy::Skip => {
                let reason = reason.unwrap_or("traffic shift not configured");
                diagnostics.warn(Warning::traffic_shift_skipped(format!(
                    "{reason}; skipping traffic shift"
                )));
                None
            }
            TrafficStrategy::Weighted(targets) => {
                let plan = TrafficWeightPlan::new(self.config.traffic.steps).ok_or_else(|| {
                    DeployError::ShiftPrecheck("shift steps must be at least 1".to_string())
                })?;
                let summary = traffic::shift_traffic(
                    load_balancer,
                    &targets,
                    &plan,
                    self.config.traffic.interval,
                    cancel,
                )
                .await?;
                Some(summary)
            }
        };

        let revision = self.state.revision.clone();
        Ok(self.transition(Completed { revision, shifted }))
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl Deployment<'_, Completed> {
    /// Consume the release and report how it ended.
    pub fn finish(self) -> DeployOutcome {
        match self.state.shifted {
            Some(shift) => DeployOutcome::Completed {
                revision: self.state.revision,
                shift,
            },
            None => DeployOutcome::CompletedNoShift {
                revision: self.state.revision,
            },
        }
    }
}
