mod cli;
mod commands;
mod config;
mod console;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose || config::debug_enabled() {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let operator = Arc::new(console::ConsoleOperator::new());
    let release = tokio::task::spawn_blocking(move || commands::run_release(cli, operator));

    tokio::select! {
        joined = release => joined?,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "Cancelled".yellow());
            // A blocking task cannot be aborted; leave without waiting for it.
            std::process::exit(0);
        }
    }
}
