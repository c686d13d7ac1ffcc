//! restprobe - black-box test runner for JSON REST APIs
//!
//! This library loads declarative test suites, sends their requests to the
//! API under test and classifies each case as passed, failed, xfailed or
//! xpassed. It also ships a mock of the fake-data API for offline runs.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod mock;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use http::ApiClient;
pub use testing::{Fixtures, RunOptions, RunSummary, TestSuite};
