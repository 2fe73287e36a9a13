// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to keep revision, listener and target group IDs apart.

mod id;
mod image_ref;
mod resource_name;

pub use id::{ListenerId, RevisionId, TargetGroupId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use resource_name::{ClusterName, ResourceNameError, ServiceName};
