// ABOUTME: Publishes a new run-specification revision with an image override applied.
// ABOUTME: Falls back to the current revision when no complete override is given.

use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::ClusterOps;
use crate::types::{ImageRef, RevisionId};

use super::error::{ClusterErrorExt, DeployError};

/// Produce the revision the service should run.
///
/// Without both an image and a container name this returns `current`
/// untouched and makes no calls. Otherwise the current specification is
/// fetched, the named container's image replaced, and the copy registered.
///
/// A container name the run specification does not have still registers a new
/// revision, with every image unchanged, and records a warning.
///
/// # Errors
///
/// - `DeployError::Discovery` if the current specification cannot be read
/// - `DeployError::Registration` if the new revision is rejected
pub async fn publish_revision<C: ClusterOps>(
    cluster: &C,
    current: &RevisionId,
    image: Option<&ImageRef>,
    container: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<RevisionId, DeployError> {
    let (image, container) = match (image, container) {
        (Some(image), Some(container)) => (image, container),
        (None, None) => {
            tracing::info!(revision = %current, "No image override; keeping current revision");
            return Ok(current.clone());
        }
        (Some(image), None) => {
            diagnostics.warn(Warning::partial_image_override(format!(
                "image {image} given without a container name; keeping revision {current}"
            )));
            return Ok(current.clone());
        }
        (None, Some(container)) => {
            diagnostics.warn(Warning::partial_image_override(format!(
                "container {container} given without an image; keeping revision {current}"
            )));
            return Ok(current.clone());
        }
    };

    let spec = cluster
        .describe_run_specification(current)
        .await
        .context_discovery()?;

    let (next, matched) = spec.with_container_image(container, image.as_str());
    if !matched {
        // TODO: decide whether a missing container should fail the release
        // instead of registering a revision that still runs the old image.
        diagnostics.warn(Warning::container_not_found(format!(
            "no container named {container} in {}; registering with original images",
            spec.family
        )));
    }

    let revision = cluster
        .register_run_specification(&next)
        .await
        .context_registration()?;

    tracing::info!(
        revision = %revision,
        family = %next.family,
        container,
        image = %image,
        "Registered new revision"
    );
    Ok(revision)
}
