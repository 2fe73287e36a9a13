// ABOUTME: aws-CLI backed implementation of the cluster and load-balancer traits.
// ABOUTME: Spawns `aws ecs` / `aws elbv2` commands and decodes their JSON output.

use crate::platform::error::{CommandFailedSnafu, DecodeSnafu, PlatformError, SpawnSnafu};
use crate::platform::traits::{
    ClusterError, ClusterOps, LoadBalancerError, LoadBalancerOps, PlatformFailure,
    RunSpecification, ServiceDescription, StabilityOutcome, WeightedTargetGroup,
};
use crate::platform::ToolInfo;
use crate::types::{ClusterName, ListenerId, RevisionId, ServiceName};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use snafu::{IntoError, ResultExt};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

// =============================================================================
// Response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct DescribeServicesResponse {
    #[serde(default)]
    services: Vec<ServiceEntry>,
    #[serde(default)]
    failures: Vec<PlatformFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    #[serde(default)]
    task_definition: Option<RevisionId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDefinitionResponse {
    task_definition: RunSpecification,
}

// =============================================================================
// Error classification
// =============================================================================

/// Extract the service error code from aws CLI stderr, e.g.
/// `An error occurred (ListenerNotFound) when calling ...` -> `ListenerNotFound`.
fn error_code(stderr: &str) -> Option<&str> {
    let start = stderr.find("An error occurred (")? + "An error occurred (".len();
    let len = stderr[start..].find(')')?;
    Some(&stderr[start..start + len])
}

const REJECTION_CODES: &[&str] = &[
    "AccessDeniedException",
    "AccessDenied",
    "ClientException",
    "InvalidParameterException",
    "ValidationError",
    "UnauthorizedOperation",
];

fn is_rejection(err: &PlatformError) -> bool {
    err.stderr()
        .and_then(error_code)
        .is_some_and(|code| REJECTION_CODES.contains(&code))
}

fn map_cluster_error(err: PlatformError) -> ClusterError {
    if is_rejection(&err) {
        let detail = err.stderr().unwrap_or_default().trim().to_string();
        return ClusterError::Rejected(detail);
    }
    ClusterError::Platform(err)
}

fn map_load_balancer_error(err: PlatformError) -> LoadBalancerError {
    if is_rejection(&err) {
        let detail = err.stderr().unwrap_or_default().trim().to_string();
        return LoadBalancerError::Rejected(detail);
    }
    LoadBalancerError::Platform(err)
}

// =============================================================================
// AwsCli
// =============================================================================

/// Drives the ECS and ELBv2 control planes through the aws CLI.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: String,
}

impl AwsCli {
    /// Create a client for `region` using a detected CLI.
    pub fn new(tool: &ToolInfo, region: impl Into<String>) -> Self {
        Self {
            program: tool.program.clone(),
            region: region.into(),
        }
    }

    /// Human-readable command line for errors and debug logs.
    fn describe(args: &[&str]) -> String {
        let shown: Vec<&str> = args.iter().take(2).copied().collect();
        format!("aws {}", shown.join(" "))
    }

    /// Run a subcommand and return its stdout.
    async fn run(&self, args: &[&str]) -> Result<String, PlatformError> {
        let command = Self::describe(args);
        tracing::debug!("Running {}", command);

        let output = Command::new(&self.program)
            .args(args)
            .args(["--region", self.region.as_str(), "--output", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context(SpawnSnafu {
                command: command.clone(),
            })?;

        if !output.status.success() {
            return CommandFailedSnafu {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .fail();
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a subcommand and decode its JSON output.
    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, PlatformError> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout).map_err(|source| {
            DecodeSnafu {
                command: Self::describe(args),
            }
            .into_error(source)
        })
    }
}

#[async_trait]
impl ClusterOps for AwsCli {
    async fn describe_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<ServiceDescription, ClusterError> {
        let response: DescribeServicesResponse = self
            .run_json(&[
                "ecs",
                "describe-services",
                "--cluster",
                cluster.as_str(),
                "--services",
                service.as_str(),
            ])
            .await
            .map_err(map_cluster_error)?;

        if response.services.is_empty() && response.failures.is_empty() {
            return Err(ClusterError::ServiceNotFound(service.to_string()));
        }

        Ok(ServiceDescription {
            current_revision: response
                .services
                .into_iter()
                .next()
                .and_then(|s| s.task_definition),
            failures: response.failures,
        })
    }

    async fn describe_run_specification(
        &self,
        revision: &RevisionId,
    ) -> Result<RunSpecification, ClusterError> {
        let response: TaskDefinitionResponse = self
            .run_json(&[
                "ecs",
                "describe-task-definition",
                "--task-definition",
                revision.as_str(),
            ])
            .await
            .map_err(|e| {
                if e.stderr().is_some_and(|s| s.contains("Unable to describe task definition")) {
                    ClusterError::RevisionNotFound(revision.to_string())
                } else {
                    map_cluster_error(e)
                }
            })?;

        Ok(response.task_definition)
    }

    async fn register_run_specification(
        &self,
        spec: &RunSpecification,
    ) -> Result<RevisionId, ClusterError> {
        let input = serde_json::to_string(spec).map_err(|source| {
            ClusterError::Platform(
                DecodeSnafu {
                    command: "aws ecs register-task-definition".to_string(),
                }
                .into_error(source),
            )
        })?;

        let response: TaskDefinitionResponse = self
            .run_json(&["ecs", "register-task-definition", "--cli-input-json", input.as_str()])
            .await
            .map_err(map_cluster_error)?;

        response
            .task_definition
            .revision
            .ok_or_else(|| ClusterError::Rejected("registration returned no revision".to_string()))
    }

    async fn update_service(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
        revision: &RevisionId,
    ) -> Result<(), ClusterError> {
        self.run(&[
            "ecs",
            "update-service",
            "--cluster",
            cluster.as_str(),
            "--service",
            service.as_str(),
            "--task-definition",
            revision.as_str(),
        ])
        .await
        .map_err(map_cluster_error)?;
        Ok(())
    }

    async fn wait_until_stable(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<StabilityOutcome, ClusterError> {
        let result = self
            .run(&[
                "ecs",
                "wait",
                "services-stable",
                "--cluster",
                cluster.as_str(),
                "--services",
                service.as_str(),
            ])
            .await;

        match result {
            Ok(_) => Ok(StabilityOutcome::Stable),
            Err(e) if e.stderr().is_some_and(|s| s.contains("Max attempts exceeded")) => {
                Ok(StabilityOutcome::TimedOut)
            }
            Err(e) if e.stderr().is_some_and(|s| s.contains("Waiter ServicesStable failed")) => {
                Err(ClusterError::Unstable(
                    e.stderr().unwrap_or_default().trim().to_string(),
                ))
            }
            Err(e) => Err(map_cluster_error(e)),
        }
    }
}

#[async_trait]
impl LoadBalancerOps for AwsCli {
    async fn listener_exists(&self, listener: &ListenerId) -> Result<bool, LoadBalancerError> {
        let result = self
            .run(&[
                "elbv2",
                "describe-listeners",
                "--listener-arns",
                listener.as_str(),
            ])
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.stderr().and_then(error_code) == Some("ListenerNotFound") => Ok(false),
            Err(e) => Err(map_load_balancer_error(e)),
        }
    }

    async fn set_forwarding_weights(
        &self,
        listener: &ListenerId,
        weights: &[WeightedTargetGroup; 2],
    ) -> Result<(), LoadBalancerError> {
        let actions = forward_action(weights).to_string();

        self.run(&[
            "elbv2",
            "modify-listener",
            "--listener-arn",
            listener.as_str(),
            "--default-actions",
            actions.as_str(),
        ])
        .await
        .map_err(map_load_balancer_error)?;
        Ok(())
    }
}

/// Build the single weighted `forward` default action for a listener.
fn forward_action(weights: &[WeightedTargetGroup; 2]) -> serde_json::Value {
    let groups: Vec<_> = weights
        .iter()
        .map(|w| {
            json!({
                "TargetGroupArn": w.target_group.as_str(),
                "Weight": w.weight,
            })
        })
        .collect();

    json!([{
        "Type": "forward",
        "ForwardConfig": { "TargetGroups": groups },
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetGroupId;

    #[test]
    fn error_code_is_extracted_from_stderr() {
        let stderr = "\nAn error occurred (ListenerNotFound) when calling the DescribeListeners operation: One or more listeners not found\n";
        assert_eq!(error_code(stderr), Some("ListenerNotFound"));
        assert_eq!(error_code("Waiter ServicesStable failed"), None);
    }

    #[test]
    fn rejection_codes_map_to_rejected() {
        let err = PlatformError::CommandFailed {
            command: "aws ecs register-task-definition".to_string(),
            code: Some(254),
            stderr: "An error occurred (ClientException) when calling the RegisterTaskDefinition operation: Invalid cpu".to_string(),
        };
        assert!(matches!(map_cluster_error(err), ClusterError::Rejected(_)));
    }

    #[test]
    fn throttling_is_not_a_rejection() {
        let err = PlatformError::CommandFailed {
            command: "aws elbv2 modify-listener".to_string(),
            code: Some(254),
            stderr: "An error occurred (Throttling) when calling the ModifyListener operation".to_string(),
        };
        assert!(matches!(
            map_load_balancer_error(err),
            LoadBalancerError::Platform(_)
        ));
    }

    #[test]
    fn forward_action_carries_both_weights() {
        let action = forward_action(&[
            WeightedTargetGroup {
                target_group: TargetGroupId::new("tg-green"),
                weight: 30,
            },
            WeightedTargetGroup {
                target_group: TargetGroupId::new("tg-blue"),
                weight: 70,
            },
        ]);

        assert_eq!(action[0]["Type"], "forward");
        let groups = &action[0]["ForwardConfig"]["TargetGroups"];
        assert_eq!(groups[0]["TargetGroupArn"], "tg-green");
        assert_eq!(groups[0]["Weight"], 30);
        assert_eq!(groups[1]["TargetGroupArn"], "tg-blue");
        assert_eq!(groups[1]["Weight"], 70);
    }

    #[test]
    fn describe_services_response_parses_failures() {
        let response: DescribeServicesResponse = serde_json::from_str(
            r#"{"services":[],"failures":[{"arn":"arn:aws:ecs:us-east-1:1:service/prod/api","reason":"MISSING"}]}"#,
        )
        .unwrap();
        assert!(response.services.is_empty());
        assert_eq!(response.failures[0].reason.as_deref(), Some("MISSING"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn abandoned_wait_kills_the_cli() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("finished");
        let program = temp_dir.path().join("aws");
        std::fs::write(
            &program,
            format!("#!/bin/sh\nsleep 2\ntouch '{}'\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let aws = AwsCli::new(
            &ToolInfo {
                program,
                version: "aws-cli/2.15.0".to_string(),
            },
            "us-east-1",
        );
        let cluster = ClusterName::new("prod").unwrap();
        let service = ServiceName::new("api").unwrap();

        let waited = tokio::time::timeout(
            Duration::from_millis(200),
            aws.wait_until_stable(&cluster, &service),
        )
        .await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "aws child outlived the abandoned wait");
    }
}
