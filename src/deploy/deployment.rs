// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::config::Config;
use crate::types::{ClusterName, RevisionId, ServiceName};

use super::state::{Completed, Discovered, Published, Stabilized};
use super::traffic::ShiftSummary;
use super::updater::ServiceUpdate;

/// A release in progress, parameterized by its current state.
///
/// The state type parameter `S` carries the revisions known so far, so a
/// revision can only be read once the transition that produced it has run.
#[derive(Debug)]
pub struct Deployment<'a, S> {
    pub(crate) config: &'a Config,
    pub(crate) state: S,
}

impl<'a, S> Deployment<'a, S> {
    /// Get the cluster name from config.
    pub fn cluster(&self) -> &ClusterName {
        &self.config.cluster
    }

    /// Get the service name from config.
    pub fn service_name(&self) -> &ServiceName {
        &self.config.service
    }

    /// Get the config.
    pub fn config(&self) -> &'a Config {
        self.config
    }
}

impl Deployment<'_, Discovered> {
    /// Revision the service ran when the release started.
    pub fn current_revision(&self) -> &RevisionId {
        &self.state.current
    }
}

impl Deployment<'_, Published> {
    pub fn current_revision(&self) -> &RevisionId {
        &self.state.current
    }

    /// Revision the service will be pointed at.
    pub fn target_revision(&self) -> &RevisionId {
        &self.state.target
    }

    /// Whether a new revision was registered.
    pub fn is_new_revision(&self) -> bool {
        self.state.current != self.state.target
    }
}

impl Deployment<'_, Stabilized> {
    /// Revision the service now runs.
    pub fn revision(&self) -> &RevisionId {
        &self.state.revision
    }

    pub fn update(&self) -> ServiceUpdate {
        self.state.update
    }
}

impl Deployment<'_, Completed> {
    pub fn revision(&self) -> &RevisionId {
        &self.state.revision
    }

    /// Shift summary, or `None` when shifting was skipped.
    pub fn shifted(&self) -> Option<&ShiftSummary> {
        self.state.shifted.as_ref()
    }
}
