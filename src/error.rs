// ABOUTME: Application-wide error types for weir.
// ABOUTME: Configuration errors detected before any remote call, plus tool detection.

use crate::platform::PlatformError;
use crate::types::{ParseImageRefError, ResourceNameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid name: {0}")]
    InvalidName(#[from] ResourceNameError),

    #[error("invalid image: {0}")]
    InvalidImage(#[from] ParseImageRefError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type Result<T> = std::result::Result<T, Error>;
