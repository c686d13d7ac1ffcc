//! CLI command definitions
//!
//! Defines the clap commands for the restprobe CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::testing::Category;

#[derive(Subcommand)]
pub enum Commands {
    /// Run test suites against the API
    Run {
        /// Suite files or directories of *.yaml files (default: built-in suites)
        paths: Vec<PathBuf>,

        /// Run a built-in suite by name; can be given multiple times
        #[arg(long = "suite", short = 's')]
        suites: Vec<String>,

        /// Base URL of the API under test (overrides config and API_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Only run cases whose name contains this text
        #[arg(long, short = 'k')]
        filter: Option<String>,

        /// Only run cases of this category: positive, negative, edge,
        /// integration or performance. Can be given multiple times
        #[arg(long = "category", short = 'c')]
        categories: Vec<Category>,

        /// Count an xfail case that passes as a failure
        #[arg(long)]
        strict_xfail: bool,

        /// Stop at the first failing case
        #[arg(long, short = 'x')]
        fail_fast: bool,

        /// Print the report as JSON instead of coloured text
        #[arg(long)]
        json: bool,

        /// Show every step and request
        #[arg(long, short)]
        verbose: bool,
    },

    /// List suites and their cases without running them
    List {
        /// Suite files or directories of *.yaml files (default: built-in suites)
        paths: Vec<PathBuf>,

        /// List a built-in suite by name
        #[arg(long = "suite", short = 's')]
        suites: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

impl Commands {
    /// Whether verbose logging was requested
    pub fn verbose(&self) -> bool {
        matches!(self, Commands::Run { verbose: true, .. })
    }
}
