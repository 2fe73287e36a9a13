// ABOUTME: Release orchestration using the type state pattern.
// ABOUTME: Publishes a revision, waits for stability, then shifts weighted traffic.

mod cancel;
mod deployment;
mod error;
mod outcome;
mod pipeline;
mod publisher;
mod state;
mod strategy;
mod traffic;
mod transitions;
mod updater;

pub use cancel::{CancelHandle, Cancellation, Cancelled};
pub use deployment::Deployment;
pub use error::{ClusterErrorExt, DeployError, DeployErrorKind, DeployStage};
pub use outcome::{DeployOutcome, DeployReport};
pub use pipeline::run_release;
pub use publisher::publish_revision;
pub use state::{Completed, Discovered, Initialized, Published, Stabilized};
pub use strategy::TrafficStrategy;
pub use traffic::{ShiftSummary, ShiftTargets, TrafficWeightPlan, WeightSplit, shift_traffic};
pub use updater::{ServiceUpdate, update_and_wait};
