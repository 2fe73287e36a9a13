// ABOUTME: Cluster and load-balancer control planes consumed by the release pipeline.
// ABOUTME: Exposes the collaborator traits and the aws-CLI backed implementation.

mod aws_cli;
mod detection;
mod error;
pub mod traits;

pub use aws_cli::AwsCli;
pub use detection::{AWS_CLI_ENV, DetectionError, ToolInfo, detect_aws_cli};
pub use error::{PlatformError, PlatformErrorKind};
pub use traits::*;
