//! Error types for restprobe
//!
//! Assertion mismatches are reported through [`Error::Assertion`] so the
//! runner can tell a failing check apart from a broken setup.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for restprobe
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Scenario Errors ===
    #[error("Failed to parse scenario '{source_name}': {message}")]
    ScenarioParse {
        source_name: String,
        message: String,
    },

    #[error("Unknown suite '{name}' (built-in suites: {available})")]
    UnknownSuite { name: String, available: String },

    #[error("Unknown fixture '{0}'")]
    UnknownFixture(String),

    #[error("Unbound variable '{{{0}}}' in template")]
    UnboundVariable(String),

    // === HTTP Errors ===
    #[error("Unsupported HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("HTTP request {method} {url} failed: {source}")]
    Http {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // === Test Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an assertion error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Create a scenario parse error
    pub fn scenario_parse(source_name: &str, message: impl ToString) -> Self {
        Self::ScenarioParse {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an HTTP transport error
    pub fn http(method: &str, url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            method: method.to_string(),
            url: url.to_string(),
            source,
        }
    }

    /// Prefix an assertion message with where it happened
    ///
    /// Other variants pass through untouched so their classification
    /// survives.
    pub fn within(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::Assertion(message) => Self::Assertion(format!("{context}: {message}")),
            other => other,
        }
    }

    /// Whether this error is a mistake in the scenario itself
    ///
    /// Such errors fail a case even when it carries an xfail marker.
    pub fn is_scenario_defect(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::UnknownFixture(_)
                | Self::UnboundVariable(_)
                | Self::InvalidMethod(_)
                | Self::InvalidHeader { .. }
        )
    }

    /// Process exit code for errors that abort the whole run
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::ConfigParse(_)
            | Self::InvalidBaseUrl { .. }
            | Self::ScenarioParse { .. }
            | Self::UnknownSuite { .. }
            | Self::FileRead { .. } => 2,
            _ => 1,
        }
    }
}
