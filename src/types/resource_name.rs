// ABOUTME: Validated names for ECS clusters and services.
// ABOUTME: Enforces the platform's naming rules before any remote call is made.

use std::fmt;
use thiserror::Error;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("{0} name cannot be empty")]
    Empty(&'static str),

    #[error("{0} name exceeds maximum length of 255 characters")]
    TooLong(&'static str),

    #[error("invalid character in {0} name: '{1}'")]
    InvalidChar(&'static str, char),
}

fn validate(kind: &'static str, value: &str) -> Result<(), ResourceNameError> {
    if value.is_empty() {
        return Err(ResourceNameError::Empty(kind));
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ResourceNameError::TooLong(kind));
    }

    for c in value.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(ResourceNameError::InvalidChar(kind, c));
        }
    }

    Ok(())
}

/// Name of an ECS service. Letters, digits, hyphens and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        validate("service", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name or full ARN of an ECS cluster.
///
/// ARNs are passed through untouched; the platform validates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        if value.starts_with("arn:") {
            if value.len() > 2048 {
                return Err(ResourceNameError::TooLong("cluster"));
            }
            return Ok(Self(value.to_string()));
        }
        validate("cluster", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_accepts_mixed_case_and_underscores() {
        let name = ServiceName::new("Billing_API-v2").unwrap();
        assert_eq!(name.as_str(), "Billing_API-v2");
    }

    #[test]
    fn service_name_rejects_empty() {
        assert_eq!(
            ServiceName::new(""),
            Err(ResourceNameError::Empty("service"))
        );
    }

    #[test]
    fn service_name_rejects_slash() {
        assert_eq!(
            ServiceName::new("prod/api"),
            Err(ResourceNameError::InvalidChar("service", '/'))
        );
    }

    #[test]
    fn service_name_rejects_overlong() {
        let long = "a".repeat(256);
        assert_eq!(
            ServiceName::new(&long),
            Err(ResourceNameError::TooLong("service"))
        );
    }

    #[test]
    fn cluster_accepts_arn() {
        let arn = "arn:aws:ecs:eu-west-1:123456789012:cluster/prod";
        assert_eq!(ClusterName::new(arn).unwrap().as_str(), arn);
    }

    #[test]
    fn cluster_rejects_spaces() {
        assert!(ClusterName::new("prod cluster").is_err());
    }
}
