// ABOUTME: Weighted blue/green traffic shifting on a load-balancer listener.
// ABOUTME: Computes the floor-division weight plan and writes it step by step.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::platform::{LoadBalancerOps, WeightedTargetGroup};
use crate::types::{ListenerId, TargetGroupId};

use super::cancel::Cancellation;
use super::error::{DeployError, DeployStage};

/// Percentages of traffic sent to each pool. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightSplit {
    pub green: u8,
    pub blue: u8,
}

impl WeightSplit {
    /// State before the shift begins. Never written by the shifter.
    pub const ALL_BLUE: WeightSplit = WeightSplit { green: 0, blue: 100 };
    pub const ALL_GREEN: WeightSplit = WeightSplit { green: 100, blue: 0 };
}

impl fmt::Display for WeightSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "green {}% / blue {}%", self.green, self.blue)
    }
}

/// The ordered weight pairs of a shift over `steps` steps.
///
/// Step `k` sends `floor(k * 100 / steps)` percent to green. Truncation is
/// intended: three steps give 33, 66, 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficWeightPlan {
    steps: NonZeroU32,
}

impl TrafficWeightPlan {
    /// `None` when `steps` is zero.
    pub fn new(steps: u32) -> Option<Self> {
        NonZeroU32::new(steps).map(|steps| Self { steps })
    }

    pub fn steps(&self) -> u32 {
        self.steps.get()
    }

    /// Split written at `step` (1-based). Steps past the end clamp to the last.
    pub fn split_at(&self, step: u32) -> WeightSplit {
        let steps = u64::from(self.steps.get());
        let step = u64::from(step).min(steps);
        // step <= steps, so the quotient is at most 100.
        let green = (step * 100 / steps) as u8;
        WeightSplit {
            green,
            blue: 100 - green,
        }
    }

    /// `(step, split)` pairs in the order they are written.
    pub fn iter(&self) -> impl Iterator<Item = (u32, WeightSplit)> + '_ {
        (1..=self.steps.get()).map(move |step| (step, self.split_at(step)))
    }

    /// Total sleep time when every step succeeds.
    pub fn total_delay(&self, interval: Duration) -> Duration {
        interval * (self.steps.get() - 1)
    }
}

/// The listener and the two pools it forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTargets {
    pub listener: ListenerId,
    pub blue: TargetGroupId,
    pub green: TargetGroupId,
}

impl ShiftTargets {
    pub fn new(
        listener: ListenerId,
        blue: TargetGroupId,
        green: TargetGroupId,
    ) -> Result<Self, DeployError> {
        if blue == green {
            return Err(DeployError::ShiftPrecheck(format!(
                "blue and green target groups are both {blue}"
            )));
        }
        Ok(Self {
            listener,
            blue,
            green,
        })
    }

    fn weights(&self, split: WeightSplit) -> [WeightedTargetGroup; 2] {
        [
            WeightedTargetGroup {
                target_group: self.green.clone(),
                weight: split.green,
            },
            WeightedTargetGroup {
                target_group: self.blue.clone(),
                weight: split.blue,
            },
        ]
    }
}

/// What a completed shift did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftSummary {
    pub steps_applied: u32,
    pub final_split: WeightSplit,
}

/// Move traffic from blue to green over the plan's steps.
///
/// The listener is checked before anything is written. Each step replaces
/// both weights in one call. A failed write stops the shift where it is: no
/// retry and no revert.
///
/// # Errors
///
/// - `DeployError::ShiftPrecheck` if the target groups are identical or the
///   listener is missing or unreachable
/// - `DeployError::ShiftStep` if a weight write fails
/// - `DeployError::Aborted` if `cancel` fires between steps
pub async fn shift_traffic<L: LoadBalancerOps>(
    load_balancer: &L,
    targets: &ShiftTargets,
    plan: &TrafficWeightPlan,
    interval: Duration,
    cancel: &mut Cancellation,
) -> Result<ShiftSummary, DeployError> {
    if targets.blue == targets.green {
        return Err(DeployError::ShiftPrecheck(format!(
            "blue and green target groups are both {}",
            targets.blue
        )));
    }

    match load_balancer.listener_exists(&targets.listener).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(DeployError::ShiftPrecheck(format!(
                "listener {} not found",
                targets.listener
            )));
        }
        Err(e) => {
            return Err(DeployError::ShiftPrecheck(format!(
                "listener {} unreachable: {}",
                targets.listener, e
            )));
        }
    }

    tracing::info!(
        listener = %targets.listener,
        steps = plan.steps(),
        interval_secs = interval.as_secs(),
        expected_secs = plan.total_delay(interval).as_secs(),
        "Shifting traffic from {} to {}",
        targets.blue,
        targets.green
    );

    let mut last_applied = None;
    for (step, split) in plan.iter() {
        if cancel.is_cancelled() {
            return Err(DeployError::Aborted {
                stage: DeployStage::ShiftStep,
                last_applied,
            });
        }

        if let Err(e) = load_balancer
            .set_forwarding_weights(&targets.listener, &targets.weights(split))
            .await
        {
            tracing::error!(
                step,
                steps = plan.steps(),
                "Weight write failed; traffic needs manual attention"
            );
            return Err(DeployError::ShiftStep {
                step,
                steps: plan.steps(),
                last_applied,
                reason: e.to_string(),
            });
        }
        last_applied = Some(split);

        tracing::info!(
            step,
            steps = plan.steps(),
            green = split.green,
            blue = split.blue,
            "Traffic weights applied"
        );

        if step < plan.steps() && cancel.sleep(interval).await.is_err() {
            return Err(DeployError::Aborted {
                stage: DeployStage::ShiftStep,
                last_applied,
            });
        }
    }

    Ok(ShiftSummary {
        steps_applied: plan.steps(),
        final_split: last_applied.unwrap_or(WeightSplit::ALL_BLUE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greens(steps: u32) -> Vec<u8> {
        TrafficWeightPlan::new(steps)
            .unwrap()
            .iter()
            .map(|(_, split)| split.green)
            .collect()
    }

    #[test]
    fn ten_steps_move_ten_percent_each() {
        assert_eq!(greens(10), vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn three_steps_truncate() {
        assert_eq!(greens(3), vec![33, 66, 100]);
    }

    #[test]
    fn single_step_goes_straight_to_green() {
        assert_eq!(greens(1), vec![100]);
    }

    #[test]
    fn more_steps_than_percent_repeat_weights() {
        let weights = greens(150);
        assert_eq!(weights.len(), 150);
        assert_eq!(weights[0], 0);
        assert_eq!(*weights.last().unwrap(), 100);
        assert!(weights.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn zero_steps_has_no_plan() {
        assert!(TrafficWeightPlan::new(0).is_none());
    }

    #[test]
    fn split_past_end_clamps() {
        let plan = TrafficWeightPlan::new(4).unwrap();
        assert_eq!(plan.split_at(9), WeightSplit::ALL_GREEN);
    }

    #[test]
    fn huge_step_count_does_not_overflow() {
        let plan = TrafficWeightPlan::new(u32::MAX).unwrap();
        assert_eq!(plan.split_at(u32::MAX), WeightSplit::ALL_GREEN);
        assert_eq!(plan.split_at(u32::MAX / 2).green, 49);
    }

    #[test]
    fn total_delay_skips_last_step() {
        let plan = TrafficWeightPlan::new(10).unwrap();
        assert_eq!(
            plan.total_delay(Duration::from_secs(15)),
            Duration::from_secs(135)
        );
    }

    #[test]
    fn identical_target_groups_rejected() {
        let err = ShiftTargets::new(
            ListenerId::new("l"),
            TargetGroupId::new("tg"),
            TargetGroupId::new("tg"),
        )
        .unwrap_err();
        assert_eq!(err.stage(), DeployStage::ShiftPrecheck);
    }

    #[test]
    fn weights_put_green_first() {
        let targets = ShiftTargets::new(
            ListenerId::new("l"),
            TargetGroupId::new("blue"),
            TargetGroupId::new("green"),
        )
        .unwrap();
        let [green, blue] = targets.weights(WeightSplit { green: 40, blue: 60 });
        assert_eq!(green.target_group.as_str(), "green");
        assert_eq!(green.weight, 40);
        assert_eq!(blue.target_group.as_str(), "blue");
        assert_eq!(blue.weight, 60);
    }
}
