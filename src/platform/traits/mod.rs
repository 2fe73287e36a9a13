// ABOUTME: Capability traits for the external control planes.
// ABOUTME: ClusterOps covers services and run specifications, LoadBalancerOps covers listeners.

mod cluster;
mod load_balancer;
mod shared_types;

pub use cluster::{ClusterError, ClusterOps};
pub use load_balancer::{LoadBalancerError, LoadBalancerOps};
pub use shared_types::*;
