//! API test runner
//!
//! Reads YAML test suites and executes them against the API under test,
//! asserting on structured response data (status, headers, JSON fields)
//! rather than raw text.

mod assertions;
mod builtin;
mod config;
mod fixtures;
mod report;
mod runner;
mod template;

pub use assertions::{check_body, check_field, check_response};
pub use builtin::{builtin_names, builtin_suite, builtin_suites};
pub use config::*;
pub use fixtures::Fixtures;
pub use report::{CaseOutcome, CaseReport, Counts, RunSummary, SuiteReport};
pub use runner::{prepare_request, run_suite, run_suites, RunOptions};
pub use template::{render, render_value, Variables};
