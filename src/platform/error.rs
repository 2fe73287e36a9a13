// ABOUTME: Platform error types with SNAFU pattern.
// ABOUTME: Unifies tool detection and CLI invocation failures for programmatic handling.

use snafu::Snafu;

use super::detection::DetectionError;

/// Failure talking to a control plane through the aws CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlatformError {
    #[snafu(display("aws CLI unavailable: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("failed to run `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` exited with {}: {}", code.map_or("signal".to_string(), |c| c.to_string()), stderr.trim()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("unexpected output from `{command}`: {source}"))]
    Decode {
        command: String,
        source: serde_json::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The aws CLI is not installed or not runnable.
    ToolMissing,
    /// The CLI ran and reported an error.
    Remote,
    /// The CLI output could not be understood.
    Protocol,
}

impl PlatformError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PlatformErrorKind {
        match self {
            PlatformError::Detection { .. } | PlatformError::Spawn { .. } => {
                PlatformErrorKind::ToolMissing
            }
            PlatformError::CommandFailed { .. } => PlatformErrorKind::Remote,
            PlatformError::Decode { .. } => PlatformErrorKind::Protocol,
        }
    }

    /// Returns the CLI's stderr when the command itself failed.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            PlatformError::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl From<DetectionError> for PlatformError {
    fn from(source: DetectionError) -> Self {
        PlatformError::Detection { source }
    }
}
