// ABOUTME: Entry point for the weir CLI application.
// ABOUTME: Validates arguments, detects the aws CLI, and runs one release.

mod cli;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;
use weir::config::Config;
use weir::deploy::{Cancellation, DeployOutcome, run_release};
use weir::error::Result;
use weir::platform::{AwsCli, PlatformError, detect_aws_cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run the release and return the process exit code.
async fn run(cli: Cli) -> Result<i32> {
    let config = Config::from_input(cli.into_input()?)?;

    let tool = detect_aws_cli().await.map_err(PlatformError::from)?;
    tracing::debug!(program = %tool.program.display(), version = %tool.version, "Using aws CLI");
    let aws = AwsCli::new(&tool, config.region.clone());

    let (handle, mut cancel) = Cancellation::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Abort requested; stopping at the next safe point");
            handle.cancel();
        }
    });

    let report = run_release(&config, &aws, &aws, &mut cancel).await;

    if !report.warnings.is_empty() {
        tracing::info!(count = report.warnings.len(), "Release finished with warnings");
    }
    if let DeployOutcome::Failed { stage, .. } = &report.outcome {
        eprintln!("Release failed during {stage}");
    }

    Ok(report.outcome.exit_code())
}
