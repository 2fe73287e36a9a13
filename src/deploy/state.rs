// ABOUTME: Release state marker types for the type state pattern.
// ABOUTME: Each state carries the data the next transition needs.

use crate::types::RevisionId;

use super::traffic::ShiftSummary;
use super::updater::ServiceUpdate;

/// Initial state: configuration validated, nothing read yet.
/// Available actions: `discover()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Service described: the revision it currently runs is known.
/// Available actions: `publish()`
#[derive(Debug, Clone)]
pub struct Discovered {
    pub(crate) current: RevisionId,
}

/// Target revision chosen, registered if an override applied.
/// Available actions: `stabilize()`
#[derive(Debug, Clone)]
pub struct Published {
    pub(crate) current: RevisionId,
    pub(crate) target: RevisionId,
}

/// Service runs the target revision and is stable.
/// Available actions: `shift_traffic()`
#[derive(Debug, Clone)]
pub struct Stabilized {
    pub(crate) revision: RevisionId,
    pub(crate) update: ServiceUpdate,
}

/// Terminal state: traffic shifted or deliberately skipped.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) revision: RevisionId,
    pub(crate) shifted: Option<ShiftSummary>,
}
