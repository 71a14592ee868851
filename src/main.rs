//! Scenario CLI - restore, build and inspect packaging test scenarios
//!
//! Drives the configured restore and build tools against scenario
//! directories and reports the packages they produce.

use clap::Parser;
use scenario::cli::{self, GlobalOptions};
use scenario::commands::Commands;
use scenario::common::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenario", about = "Restore, build and inspect packaging test scenarios")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scenario assets root, overriding the configuration
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        assets: cli.assets,
    };

    if let Err(e) = cli::dispatch(cli.command, options).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
