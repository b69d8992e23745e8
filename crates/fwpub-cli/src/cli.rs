use std::path::PathBuf;

use clap::Parser;
use fwpub_types::DEFAULT_MIN_VERSION;

#[derive(Debug, Parser)]
#[command(
    name = "fwpub",
    about = "Build and publish a firmware release, then update the version record",
    version
)]
pub struct Cli {
    /// Release notes (default: a generic bug-fix note)
    #[arg(short, long)]
    pub changelog: Option<String>,

    /// Oldest firmware version allowed to update to this one
    #[arg(short, long, default_value = DEFAULT_MIN_VERSION)]
    pub min_version: String,

    /// Publish without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Config file (default: fwpub.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging and full error detail
    #[arg(short, long)]
    pub verbose: bool,
}
