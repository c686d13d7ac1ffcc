//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test suites.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Error, Result};

/// A suite of test cases loaded from a YAML document
#[derive(Deserialize, Debug, Clone)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// The cases, run in order
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Parse a suite from YAML text; `source_name` is used in error messages
    pub fn from_yaml(source_name: &str, content: &str) -> Result<Self> {
        let suite: TestSuite = serde_yaml::from_str(content)
            .map_err(|e| Error::scenario_parse(source_name, e))?;
        suite.validate(source_name)?;
        Ok(suite)
    }

    /// Load a suite from a YAML file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&path.display().to_string(), &content)
    }

    fn validate(&self, source_name: &str) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(Error::scenario_parse(
                    source_name,
                    format!("duplicate case name '{}'", case.name),
                ));
            }
            if case.steps.is_empty() {
                return Err(Error::scenario_parse(
                    source_name,
                    format!("case '{}' has no steps", case.name),
                ));
            }
            for step in &case.steps {
                if let TestStep::Repeat { times, .. } = step {
                    if *times == 0 {
                        return Err(Error::scenario_parse(
                            source_name,
                            format!("case '{}' repeats a request zero times", case.name),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Intent of a test case
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Valid input, happy path
    #[default]
    Positive,
    /// Invalid input, error handling
    Negative,
    /// Boundary or unusual input
    Edge,
    /// Multi-step workflow
    Integration,
    /// Timing and consistency
    Performance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Positive,
        Category::Negative,
        Category::Edge,
        Category::Integration,
        Category::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Positive => "positive",
            Category::Negative => "negative",
            Category::Edge => "edge",
            Category::Integration => "integration",
            Category::Performance => "performance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("Unknown category '{s}'")))
    }
}

/// A single test case
#[derive(Deserialize, Debug, Clone)]
pub struct TestCase {
    /// Case name, unique within its suite
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub description: Option<String>,
    /// Known defect: the case is expected to fail for this reason
    pub xfail: Option<String>,
    /// Do not run the case at all
    pub skip: Option<String>,
    /// The sequence of steps to execute
    pub steps: Vec<TestStep>,
}

/// A single step in a test case
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Send one request
    Request {
        #[serde(flatten)]
        request: RequestSpec,
        /// Expectations for the response
        expect: Option<ResponseExpectation>,
        /// Values to remember for later steps
        #[serde(default)]
        capture: BTreeMap<String, Capture>,
    },
    /// Send the same request several times
    Repeat {
        times: u32,
        request: RequestSpec,
        /// Expectations applied to every response
        expect: Option<ResponseExpectation>,
        /// Require every JSON body to be identical
        #[serde(default)]
        consistent: bool,
    },
}

/// Description of an HTTP request; strings may contain `{var}` placeholders
#[derive(Deserialize, Debug, Clone)]
pub struct RequestSpec {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

/// Request payload
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum RequestBody {
    /// Inline JSON
    Json(Value),
    /// A named fixture payload
    Fixture(String),
    /// Raw text sent as-is
    Raw(String),
}

/// Value captured from a response
#[derive(Deserialize, Debug, Clone)]
pub struct Capture {
    /// JSON pointer into the response body
    pub pointer: String,
    /// Used when the pointer does not resolve
    pub default: Option<Value>,
}

/// Accepted status codes: a single code or a list
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    One(u16),
    AnyOf(Vec<u16>),
}

impl StatusExpectation {
    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusExpectation::One(code) => *code == status,
            StatusExpectation::AnyOf(codes) => codes.contains(&status),
        }
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusExpectation::One(code) => write!(f, "{code}"),
            StatusExpectation::AnyOf(codes) => {
                let codes: Vec<String> = codes.iter().map(u16::to_string).collect();
                write!(f, "one of [{}]", codes.join(", "))
            }
        }
    }
}

/// Expectations for a response
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ResponseExpectation {
    pub status: Option<StatusExpectation>,
    /// Header name to expected substring of its value
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<BodyExpectation>,
    /// Body checks that apply only for some statuses
    pub when_status: Option<ConditionalBody>,
    /// Upper bound on request round-trip time
    pub max_elapsed_ms: Option<u64>,
}

/// Body checks gated on the response status
#[derive(Deserialize, Debug, Clone)]
pub struct ConditionalBody {
    pub status: StatusExpectation,
    pub body: BodyExpectation,
}

/// Shape of a JSON document
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JsonKind {
    Object,
    Array,
}

/// Expectations for a JSON body
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BodyExpectation {
    pub kind: Option<JsonKind>,
    /// Arrays and objects must have at least one element
    #[serde(default)]
    pub non_empty: bool,
    #[serde(default)]
    pub fields: Vec<FieldAssertion>,
    /// Applied to every element of an array body
    #[serde(default)]
    pub each: Vec<FieldAssertion>,
}

/// Assertion on one field, addressed by JSON pointer
#[derive(Deserialize, Debug, Clone)]
pub struct FieldAssertion {
    pub pointer: String,
    /// Field must be present (true) or absent (false)
    pub exists: Option<bool>,
    /// Expected value (exact match)
    pub equals: Option<Value>,
    /// Pointer into the sent JSON body whose value must match
    pub equals_request: Option<String>,
    /// Expected substring of a string field
    pub contains: Option<String>,
}
