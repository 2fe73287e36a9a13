// ABOUTME: Load-balancer control-plane trait for weighted forwarding.
// ABOUTME: Listener existence checks and atomic two-target-group weight writes.

use super::shared_types::WeightedTargetGroup;
use crate::platform::PlatformError;
use crate::types::ListenerId;
use async_trait::async_trait;

/// Operations against the load-balancer control plane.
#[async_trait]
pub trait LoadBalancerOps: Send + Sync {
    /// Read-only existence check. `Ok(false)` means the listener is gone.
    async fn listener_exists(&self, listener: &ListenerId) -> Result<bool, LoadBalancerError>;

    /// Replace the listener's forward action with exactly these two weighted
    /// target groups, in one call.
    async fn set_forwarding_weights(
        &self,
        listener: &ListenerId,
        weights: &[WeightedTargetGroup; 2],
    ) -> Result<(), LoadBalancerError>;
}

/// Errors from load-balancer operations.
#[derive(Debug, thiserror::Error)]
pub enum LoadBalancerError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
