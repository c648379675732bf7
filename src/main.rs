//! starcat - discover, rank and star AstrBot plugins from the community catalog

use anyhow::Result;
use clap::Parser;
use starcat::cli::{self, Command};
use std::path::PathBuf;

/// Discover, rank and star AstrBot plugins from the community catalog
#[derive(Parser, Debug)]
#[command(name = "starcat")]
#[command(about = "Discover, rank and star AstrBot plugins from the community catalog", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Caller identity checked against allowedUsers
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    cli::run(args.command, args.config.as_deref(), args.user.as_deref()).await
}
