// ABOUTME: Immutable release configuration built from CLI arguments and environment.
// ABOUTME: Validates names, image override, and traffic-shift settings before any remote call.

mod env;

pub use env::{BLUE_TARGET_GROUP_ENV, GREEN_TARGET_GROUP_ENV, explicit_or_env, non_empty_var};

use crate::error::{Error, Result};
use crate::types::{ClusterName, ImageRef, ListenerId, ServiceName, TargetGroupId};
use std::time::Duration;

pub const DEFAULT_SHIFT_STEPS: u32 = 10;
pub const DEFAULT_SHIFT_INTERVAL: Duration = Duration::from_secs(15);
/// Outer bound on the stabilization wait. The platform waiter gives up after
/// ten minutes on its own; this guards against a wedged waiter.
pub const DEFAULT_STABILIZATION_TIMEOUT: Duration = Duration::from_secs(900);

/// Raw, unvalidated inputs. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    pub region: String,
    pub cluster: String,
    pub service: String,
    pub image: Option<String>,
    pub container: Option<String>,
    pub listener: Option<String>,
    pub steps: Option<u32>,
    pub interval_secs: Option<u64>,
    pub blue_target_group: Option<String>,
    pub green_target_group: Option<String>,
    pub stabilization_timeout_secs: Option<u64>,
}

/// Everything a release needs, passed by reference into each stage.
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub cluster: ClusterName,
    pub service: ServiceName,
    /// Image to apply. Publishing only happens when `container` is also set.
    pub image: Option<ImageRef>,
    /// Container whose image is replaced.
    pub container: Option<String>,
    pub traffic: TrafficSettings,
    pub stabilization_timeout: Duration,
}

/// Listener, target groups and pacing for the weighted shift.
#[derive(Debug, Clone)]
pub struct TrafficSettings {
    pub listener: Option<ListenerId>,
    pub blue: Option<TargetGroupId>,
    pub green: Option<TargetGroupId>,
    pub steps: u32,
    pub interval: Duration,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            listener: None,
            blue: None,
            green: None,
            steps: DEFAULT_SHIFT_STEPS,
            interval: DEFAULT_SHIFT_INTERVAL,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_region(region: &str) -> Result<()> {
    if region.is_empty() {
        return Err(Error::MissingArgument("region"));
    }
    if let Some(c) = region
        .chars()
        .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
    {
        return Err(Error::InvalidArgument {
            name: "region",
            reason: format!("unexpected character '{c}' in {region}"),
        });
    }
    Ok(())
}

impl Config {
    /// Minimal configuration: no image override, no traffic shift.
    pub fn new(region: &str, cluster: &str, service: &str) -> Result<Self> {
        let region = region.trim();
        validate_region(region)?;

        Ok(Config {
            region: region.to_string(),
            cluster: ClusterName::new(cluster.trim())?,
            service: ServiceName::new(service.trim())?,
            image: None,
            container: None,
            traffic: TrafficSettings::default(),
            stabilization_timeout: DEFAULT_STABILIZATION_TIMEOUT,
        })
    }

    /// Build and validate a configuration from raw inputs.
    ///
    /// Target groups not given explicitly are read from
    /// `BLUE_TARGET_GROUP_ARN` / `GREEN_TARGET_GROUP_ARN`.
    pub fn from_input(input: ConfigInput) -> Result<Self> {
        if input.cluster.trim().is_empty() {
            return Err(Error::MissingArgument("cluster"));
        }
        if input.service.trim().is_empty() {
            return Err(Error::MissingArgument("service"));
        }

        let mut config = Config::new(&input.region, &input.cluster, &input.service)?;

        config.image = present(input.image)
            .map(|i| ImageRef::parse(&i))
            .transpose()?;
        config.container = present(input.container);

        config.traffic = TrafficSettings {
            listener: present(input.listener).map(ListenerId::new),
            blue: explicit_or_env(input.blue_target_group, BLUE_TARGET_GROUP_ENV)
                .map(TargetGroupId::new),
            green: explicit_or_env(input.green_target_group, GREEN_TARGET_GROUP_ENV)
                .map(TargetGroupId::new),
            steps: input.steps.unwrap_or(DEFAULT_SHIFT_STEPS),
            interval: input
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SHIFT_INTERVAL),
        };

        if let Some(secs) = input.stabilization_timeout_secs {
            config.stabilization_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field rules that individual parsers cannot.
    pub fn validate(&self) -> Result<()> {
        if self.traffic.steps == 0 {
            return Err(Error::InvalidArgument {
                name: "shift-steps",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.stabilization_timeout.is_zero() {
            return Err(Error::InvalidArgument {
                name: "stabilization-timeout-secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if let (Some(blue), Some(green)) = (&self.traffic.blue, &self.traffic.green) {
            if blue == green {
                return Err(Error::InvalidConfig(format!(
                    "blue and green target groups must differ (both are {blue})"
                )));
            }
            if self.traffic.listener.is_none() {
                return Err(Error::MissingArgument("listener"));
            }
        }

        Ok(())
    }
}
