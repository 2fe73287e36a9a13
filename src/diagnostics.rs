// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release.
// ABOUTME: Collects warnings that degrade to a no-op or skip instead of failing the release.

/// Collects non-fatal warnings during a release.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Consume the accumulator, returning the warnings in the order recorded.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The requested container does not exist in the run specification.
    pub fn container_not_found(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ContainerNotFound,
            message: message.into(),
        }
    }

    /// Only one of image and container name was supplied.
    pub fn partial_image_override(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PartialImageOverride,
            message: message.into(),
        }
    }

    /// Traffic shifting was skipped because target groups are not configured.
    pub fn traffic_shift_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TrafficShiftSkipped,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Image override named a container the run specification does not have.
    /// The revision is registered with its original images.
    ContainerNotFound,
    /// Image given without container name, or the reverse. Nothing is published.
    PartialImageOverride,
    /// Blue or green target group missing.
    TrafficShiftSkipped,
}
