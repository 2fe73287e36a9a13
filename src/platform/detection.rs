// ABOUTME: Detection of the aws CLI that backs the platform collaborators.
// ABOUTME: Honors an explicit WEIR_AWS_CLI override before falling back to PATH.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Environment variable naming an explicit aws CLI binary.
pub const AWS_CLI_ENV: &str = "WEIR_AWS_CLI";

const DEFAULT_PROGRAM: &str = "aws";

/// Error during tool detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("missing required tool: {0} (install the AWS CLI or set WEIR_AWS_CLI)")]
    NotInstalled(String),

    #[error("{program} --version failed: {reason}")]
    Unusable { program: String, reason: String },
}

/// A usable aws CLI.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Program to invoke.
    pub program: PathBuf,
    /// Version line reported by the tool, e.g. `aws-cli/2.15.0`.
    pub version: String,
}

/// Locate the aws CLI and confirm it runs.
///
/// Detection order:
/// 1. `WEIR_AWS_CLI`, when set and non-empty
/// 2. `aws` on `PATH`
pub async fn detect_aws_cli() -> Result<ToolInfo, DetectionError> {
    let program = std::env::var(AWS_CLI_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));

    let output = Command::new(&program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                DetectionError::NotInstalled(program.display().to_string())
            }
            _ => DetectionError::Unusable {
                program: program.display().to_string(),
                reason: e.to_string(),
            },
        })?;

    if !output.status.success() {
        return Err(DetectionError::Unusable {
            program: program.display().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    // aws v1 printed its version on stderr.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = parse_version(&stdout)
        .or_else(|| parse_version(&stderr))
        .unwrap_or_else(|| "unknown".to_string());

    tracing::debug!("Using {} ({})", program.display(), version);

    Ok(ToolInfo { program, version })
}

fn parse_version(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| token.starts_with("aws-cli/"))
        .map(|token| token.to_string())
}
