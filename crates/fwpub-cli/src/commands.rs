use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use fwpub_exec::{SystemRunner, ToolLocator};
use fwpub_sdk::{Operator, Release, ReleaseOptions, ReleaseOutcome};

use crate::cli::Cli;
use crate::config;

/// Run a release. Pipeline failures are reported here and turned into a
/// failing exit code; only config problems propagate as errors.
pub fn run_release(cli: Cli, operator: Arc<dyn Operator>) -> anyhow::Result<ExitCode> {
    let config = config::load(cli.config.as_deref())?;
    let debug = cli.verbose || config::debug_enabled();
    tracing::debug!(?config, "loaded configuration");

    let release = Release::new(
        config,
        Arc::new(SystemRunner::new()),
        ToolLocator::from_env(),
        operator,
    )
    .with_debug(debug);

    let options = ReleaseOptions {
        changelog: cli.changelog,
        min_version: cli.min_version,
        assume_yes: cli.yes,
    };

    match release.run(&options) {
        Ok(ReleaseOutcome::Published(summary)) => {
            tracing::info!(
                firmware = %summary.info,
                backend = summary.backend.as_str(),
                "release finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(ReleaseOutcome::Declined) => {
            println!("{}", "Nothing published.".dimmed());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{} {err}", "✗".red().bold());
            if debug {
                eprintln!("{}", format!("{err:#?}").dimmed());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
