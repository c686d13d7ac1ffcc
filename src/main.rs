//! restprobe - black-box test runner for JSON REST APIs
//!
//! Runs declarative YAML suites against a live or mocked API and reports
//! pass / fail / xfail outcomes per case.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use restprobe::common::logging;
use restprobe::{cli, commands};

#[derive(Parser)]
#[command(name = "restprobe", about = "Black-box test runner for JSON REST APIs")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir, or RESTPROBE_CONFIG)
    #[arg(long, global = true, env = "RESTPROBE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.command.verbose());

    match cli::dispatch(cli.command, cli.config.as_deref()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
