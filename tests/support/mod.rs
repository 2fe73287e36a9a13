// ABOUTME: Test support utilities.
// ABOUTME: Scriptable in-memory cluster and load-balancer fakes that record every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Once;
use tokio::time::Instant;
use weir::config::Config;
use weir::platform::{
    ClusterError, ClusterOps, ContainerSpec, LoadBalancerError, LoadBalancerOps,
    PlacementConstraint, PlatformFailure, RunSpecification, ServiceDescription, StabilityOutcome,
    Volume, WeightedTargetGroup,
};
use weir::types::{ClusterName, ListenerId, RevisionId, ServiceName, TargetGroupId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("weir=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const CURRENT_REVISION: &str = "arn:aws:ecs:us-east-1:123456789012:task-definition/api:7";
pub const NEW_REVISION: &str = "arn:aws:ecs:us-east-1:123456789012:task-definition/api:8";

/// Minimal configuration with no image override and no traffic shift.
#[allow(dead_code)]
pub fn base_config() -> Config {
    Config::new("us-east-1", "prod", "api").unwrap()
}

/// Configuration that shifts traffic over `steps` steps.
#[allow(dead_code)]
pub fn shifting_config(steps: u32, interval_secs: u64) -> Config {
    let mut config = base_config();
    config.traffic.listener = Some(ListenerId::new("listener-1"));
    config.traffic.blue = Some(TargetGroupId::new("tg-blue"));
    config.traffic.green = Some(TargetGroupId::new("tg-green"));
    config.traffic.steps = steps;
    config.traffic.interval = std::time::Duration::from_secs(interval_secs);
    config
}

/// A two-container specification with every optional field populated.
#[allow(dead_code)]
pub fn sample_spec() -> RunSpecification {
    let mut app = ContainerSpec::new("app", "registry.example.com/api:v1");
    app.settings = serde_json::json!({
        "essential": true,
        "portMappings": [{ "containerPort": 8080, "protocol": "tcp" }],
        "environment": [{ "name": "MODE", "value": "prod" }],
    })
    .as_object()
    .unwrap()
    .clone();

    RunSpecification {
        revision: Some(RevisionId::new(CURRENT_REVISION)),
        family: "api".to_string(),
        network_mode: Some("awsvpc".to_string()),
        cpu: Some("512".to_string()),
        memory: Some("1024".to_string()),
        containers: vec![app, ContainerSpec::new("sidecar", "envoyproxy/envoy:v1.29")],
        volumes: vec![Volume {
            name: "scratch".to_string(),
            settings: serde_json::Map::new(),
        }],
        placement_constraints: vec![PlacementConstraint {
            kind: "memberOf".to_string(),
            expression: Some("attribute:ecs.availability-zone in [us-east-1a]".to_string()),
        }],
        execution_role_arn: Some("arn:aws:iam::123456789012:role/exec".to_string()),
        task_role_arn: None,
        requires_compatibilities: vec!["FARGATE".to_string()],
        settings: serde_json::json!({
            "runtimePlatform": { "cpuArchitecture": "ARM64", "operatingSystemFamily": "LINUX" },
            "ephemeralStorage": { "sizeInGiB": 40 },
            "revision": 7,
            "status": "ACTIVE",
        })
        .as_object()
        .unwrap()
        .clone(),
    }
}

// =============================================================================
// FakeCluster
// =============================================================================

/// A call made against the fake cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterCall {
    DescribeService,
    DescribeRunSpecification(String),
    Register(Box<RunSpecification>),
    UpdateService(String),
    WaitUntilStable,
}

/// How the fake responds to a stabilization wait.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Stability {
    Stable,
    TimedOut,
    Unstable(String),
    /// Never returns.
    Hang,
}

struct ClusterState {
    description: ServiceDescription,
    spec: Option<RunSpecification>,
    describe_fails: Option<String>,
    register_fails: Option<String>,
    update_fails: Option<String>,
    stability: Stability,
    calls: Vec<ClusterCall>,
}

pub struct FakeCluster {
    state: Mutex<ClusterState>,
}

#[allow(dead_code)]
impl FakeCluster {
    /// A service on `CURRENT_REVISION` described by `sample_spec()`.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClusterState {
                description: ServiceDescription {
                    current_revision: Some(RevisionId::new(CURRENT_REVISION)),
                    failures: vec![],
                },
                spec: Some(sample_spec()),
                describe_fails: None,
                register_fails: None,
                update_fails: None,
                stability: Stability::Stable,
                calls: vec![],
            }),
        }
    }

    pub fn with_failure(self, reason: &str) -> Self {
        self.state.lock().description.failures.push(PlatformFailure {
            arn: Some("arn:aws:ecs:us-east-1:123456789012:service/prod/api".to_string()),
            reason: Some(reason.to_string()),
            detail: None,
        });
        self
    }

    pub fn without_current_revision(self) -> Self {
        self.state.lock().description.current_revision = None;
        self
    }

    pub fn failing_describe(self, reason: &str) -> Self {
        self.state.lock().describe_fails = Some(reason.to_string());
        self
    }

    pub fn failing_registration(self, reason: &str) -> Self {
        self.state.lock().register_fails = Some(reason.to_string());
        self
    }

    pub fn failing_update(self, reason: &str) -> Self {
        self.state.lock().update_fails = Some(reason.to_string());
        self
    }

    pub fn with_stability(self, stability: Stability) -> Self {
        self.state.lock().stability = stability;
        self
    }

    pub fn calls(&self) -> Vec<ClusterCall> {
        self.state.lock().calls.clone()
    }

    /// Specifications passed to registration, in order.
    pub fn registered(&self) -> Vec<RunSpecification> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ClusterCall::Register(spec) => Some(*spec),
                _ => None,
            })
            .collect()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ClusterCall::UpdateService(_)))
            .count()
    }

    fn record(&self, call: ClusterCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl ClusterOps for FakeCluster {
    async fn describe_service(
        &self,
        _cluster: &ClusterName,
        _service: &ServiceName,
    ) -> Result<ServiceDescription, ClusterError> {
        self.record(ClusterCall::DescribeService);
        Ok(self.state.lock().description.clone())
    }

    async fn describe_run_specification(
        &self,
        revision: &RevisionId,
    ) -> Result<RunSpecification, ClusterError> {
        self.record(ClusterCall::DescribeRunSpecification(revision.to_string()));
        let state = self.state.lock();
        if let Some(reason) = &state.describe_fails {
            return Err(ClusterError::Rejected(reason.clone()));
        }
        state
            .spec
            .clone()
            .ok_or_else(|| ClusterError::RevisionNotFound(revision.to_string()))
    }

    async fn register_run_specification(
        &self,
        spec: &RunSpecification,
    ) -> Result<RevisionId, ClusterError> {
        self.record(ClusterCall::Register(Box::new(spec.clone())));
        if let Some(reason) = &self.state.lock().register_fails {
            return Err(ClusterError::Rejected(reason.clone()));
        }
        Ok(RevisionId::new(NEW_REVISION))
    }

    async fn update_service(
        &self,
        _cluster: &ClusterName,
        _service: &ServiceName,
        revision: &RevisionId,
    ) -> Result<(), ClusterError> {
        self.record(ClusterCall::UpdateService(revision.to_string()));
        if let Some(reason) = &self.state.lock().update_fails {
            return Err(ClusterError::Rejected(reason.clone()));
        }
        Ok(())
    }

    async fn wait_until_stable(
        &self,
        _cluster: &ClusterName,
        _service: &ServiceName,
    ) -> Result<StabilityOutcome, ClusterError> {
        self.record(ClusterCall::WaitUntilStable);
        let stability = self.state.lock().stability.clone();
        match stability {
            Stability::Stable => Ok(StabilityOutcome::Stable),
            Stability::TimedOut => Ok(StabilityOutcome::TimedOut),
            Stability::Unstable(reason) => Err(ClusterError::Unstable(reason)),
            Stability::Hang => std::future::pending().await,
        }
    }
}

// =============================================================================
// FakeLoadBalancer
// =============================================================================

/// What the listener existence check reports.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum ListenerState {
    Exists,
    Missing,
    Unreachable,
}

/// A successful weight write.
#[derive(Debug, Clone)]
pub struct WeightWrite {
    pub listener: String,
    pub weights: Vec<(String, u8)>,
    pub at: Instant,
}

impl WeightWrite {
    /// Weight sent to `target_group` in this write.
    #[allow(dead_code)]
    pub fn weight_of(&self, target_group: &str) -> Option<u8> {
        self.weights
            .iter()
            .find(|(tg, _)| tg == target_group)
            .map(|(_, w)| *w)
    }
}

struct LoadBalancerState {
    listener: ListenerState,
    fail_on_write: Option<usize>,
    describe_calls: usize,
    write_attempts: usize,
    writes: Vec<WeightWrite>,
}

pub struct FakeLoadBalancer {
    state: Mutex<LoadBalancerState>,
}

#[allow(dead_code)]
impl FakeLoadBalancer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoadBalancerState {
                listener: ListenerState::Exists,
                fail_on_write: None,
                describe_calls: 0,
                write_attempts: 0,
                writes: vec![],
            }),
        }
    }

    pub fn with_listener(self, listener: ListenerState) -> Self {
        self.state.lock().listener = listener;
        self
    }

    /// Fail the `n`th weight write (1-based).
    pub fn failing_write(self, n: usize) -> Self {
        self.state.lock().fail_on_write = Some(n);
        self
    }

    pub fn writes(&self) -> Vec<WeightWrite> {
        self.state.lock().writes.clone()
    }

    /// Green weights of every successful write, in order.
    pub fn green_weights(&self) -> Vec<u8> {
        self.writes()
            .iter()
            .filter_map(|w| w.weight_of("tg-green"))
            .collect()
    }

    pub fn describe_calls(&self) -> usize {
        self.state.lock().describe_calls
    }

    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock();
        state.describe_calls + state.write_attempts
    }
}

#[async_trait]
impl LoadBalancerOps for FakeLoadBalancer {
    async fn listener_exists(&self, _listener: &ListenerId) -> Result<bool, LoadBalancerError> {
        let mut state = self.state.lock();
        state.describe_calls += 1;
        match state.listener {
            ListenerState::Exists => Ok(true),
            ListenerState::Missing => Ok(false),
            ListenerState::Unreachable => {
                Err(LoadBalancerError::Rejected("access denied".to_string()))
            }
        }
    }

    async fn set_forwarding_weights(
        &self,
        listener: &ListenerId,
        weights: &[WeightedTargetGroup; 2],
    ) -> Result<(), LoadBalancerError> {
        let mut state = self.state.lock();
        state.write_attempts += 1;
        if state.fail_on_write == Some(state.write_attempts) {
            return Err(LoadBalancerError::Rejected("Throttling".to_string()));
        }
        state.writes.push(WeightWrite {
            listener: listener.to_string(),
            weights: weights
                .iter()
                .map(|w| (w.target_group.to_string(), w.weight))
                .collect(),
            at: Instant::now(),
        });
        Ok(())
    }
}
