// ABOUTME: Traffic strategy selection based on configuration.
// ABOUTME: Determines whether the release ends with a weighted shift or skips it.

use crate::config::Config;

use super::traffic::ShiftTargets;

/// How traffic moves once the service is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrafficStrategy {
    /// Weighted shift from blue to green on the listener.
    Weighted(ShiftTargets),

    /// No shift. The release is done once the service is stable.
    Skip,
}

impl TrafficStrategy {
    /// Determine the traffic strategy for this configuration.
    /// Returns the strategy and a reason when the shift is skipped.
    ///
    /// Both target groups and the listener are needed for a shift. Config
    /// validation already rejects two target groups without a listener, so a
    /// missing listener here only happens with at most one target group.
    pub fn for_config(config: &Config) -> (Self, Option<&'static str>) {
        let traffic = &config.traffic;
        match (&traffic.listener, &traffic.blue, &traffic.green) {
            (Some(listener), Some(blue), Some(green)) => (
                TrafficStrategy::Weighted(ShiftTargets {
                    listener: listener.clone(),
                    blue: blue.clone(),
                    green: green.clone(),
                }),
                None,
            ),
            (_, None, None) => (
                TrafficStrategy::Skip,
                Some("blue/green target groups not configured"),
            ),
            (_, None, Some(_)) => (
                TrafficStrategy::Skip,
                Some("blue target group not configured"),
            ),
            (_, Some(_), None) => (
                TrafficStrategy::Skip,
                Some("green target group not configured"),
            ),
            (None, Some(_), Some(_)) => (TrafficStrategy::Skip, Some("listener not configured")),
        }
    }
}
