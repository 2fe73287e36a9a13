// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Positional release arguments plus logging and target-group options.

use clap::Parser;
use weir::config::ConfigInput;
use weir::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "weir")]
#[command(about = "Blue/green releases for container services with weighted traffic shifting")]
#[command(version)]
pub struct Cli {
    /// Region the cluster and load balancer live in
    pub region: String,

    /// Cluster name or ARN
    pub cluster: String,

    /// Service to release
    pub service: String,

    /// Image to apply (pass "" to keep the current images)
    pub image: Option<String>,

    /// Container whose image is replaced
    pub container_name: Option<String>,

    /// Listener that forwards to the blue and green target groups
    pub listener: Option<String>,

    /// Number of traffic shift steps
    pub steps: Option<String>,

    /// Seconds to wait between shift steps
    pub interval_secs: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Upper bound on the stabilization wait, in seconds
    #[arg(long, value_name = "SECS")]
    pub stabilization_timeout_secs: Option<u64>,

    /// Blue target group (defaults to $BLUE_TARGET_GROUP_ARN)
    #[arg(long, value_name = "ARN")]
    pub blue_target_group: Option<String>,

    /// Green target group (defaults to $GREEN_TARGET_GROUP_ARN)
    #[arg(long, value_name = "ARN")]
    pub green_target_group: Option<String>,
}

fn given(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn number<T: std::str::FromStr>(value: Option<String>, name: &'static str) -> Result<Option<T>> {
    given(value)
        .map(|v| {
            v.trim().parse().map_err(|_| Error::InvalidArgument {
                name,
                reason: format!("'{v}' is not a non-negative integer"),
            })
        })
        .transpose()
}

impl Cli {
    /// Convert parsed arguments into raw configuration input.
    ///
    /// Empty positionals count as absent so a caller can skip the image and
    /// container slots.
    pub fn into_input(self) -> Result<ConfigInput> {
        Ok(ConfigInput {
            steps: number(self.steps, "shift steps")?,
            interval_secs: number(self.interval_secs, "shift interval")?,
            region: self.region,
            cluster: self.cluster,
            service: self.service,
            image: given(self.image),
            container: given(self.container_name),
            listener: given(self.listener),
            blue_target_group: given(self.blue_target_group),
            green_target_group: given(self.green_target_group),
            stabilization_timeout_secs: self.stabilization_timeout_secs,
        })
    }
}
