//! Outcome aggregation and rendering

use std::fmt;

use colored::Colorize;
use serde::Serialize;

use super::config::Category;

/// Final state of a single case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed { step: usize, message: String },
    /// Failed as documented by its xfail marker
    #[serde(rename = "xfailed")]
    XFailed { reason: String, message: String },
    /// Marked xfail but passed anyway
    #[serde(rename = "xpassed")]
    XPassed { reason: String },
    Skipped { reason: String },
}

impl CaseOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CaseOutcome::Passed => "PASSED",
            CaseOutcome::Failed { .. } => "FAILED",
            CaseOutcome::XFailed { .. } => "XFAIL",
            CaseOutcome::XPassed { .. } => "XPASS",
            CaseOutcome::Skipped { .. } => "SKIPPED",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Failed { .. })
    }
}

/// Report for one case
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub category: Category,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
    pub steps_run: usize,
    pub steps_total: usize,
    pub elapsed_ms: u64,
}

/// Tally of outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub xfailed: usize,
    pub xpassed: usize,
    pub skipped: usize,
}

impl Counts {
    pub fn record(&mut self, outcome: &CaseOutcome) {
        match outcome {
            CaseOutcome::Passed => self.passed += 1,
            CaseOutcome::Failed { .. } => self.failed += 1,
            CaseOutcome::XFailed { .. } => self.xfailed += 1,
            CaseOutcome::XPassed { .. } => self.xpassed += 1,
            CaseOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.xfailed + self.xpassed + self.skipped
    }

    fn merge(&mut self, other: Counts) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.xfailed += other.xfailed;
        self.xpassed += other.xpassed;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        parts.push(format!("{} passed", self.passed));
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if self.xfailed > 0 {
            parts.push(format!("{} xfailed", self.xfailed));
        }
        if self.xpassed > 0 {
            parts.push(format!("{} xpassed", self.xpassed));
        }
        f.write_str(&parts.join(", "))
    }
}

/// Report for one suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub cases: Vec<CaseReport>,
    pub elapsed_ms: u64,
}

impl SuiteReport {
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for case in &self.cases {
            counts.record(&case.outcome);
        }
        counts
    }

    pub fn is_success(&self) -> bool {
        self.counts().failed == 0
    }

    /// Find a case by name
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }
}

/// Reports of every suite in a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub base_url: String,
    pub suites: Vec<SuiteReport>,
}

impl RunSummary {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            suites: Vec::new(),
        }
    }

    pub fn totals(&self) -> Counts {
        let mut counts = Counts::default();
        for suite in &self.suites {
            counts.merge(suite.counts());
        }
        counts
    }

    pub fn is_success(&self) -> bool {
        self.totals().failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print the closing summary block
    pub fn print(&self) {
        let failures: Vec<(&str, &CaseReport)> = self
            .suites
            .iter()
            .flat_map(|s| s.cases.iter().map(move |c| (s.suite.as_str(), c)))
            .filter(|(_, c)| c.outcome.is_failure())
            .collect();

        if !failures.is_empty() {
            println!("\n{}", "Failures:".red().bold());
            for (suite, case) in &failures {
                if let CaseOutcome::Failed { step, message } = &case.outcome {
                    println!(
                        "  {} {}::{} (step {}): {}",
                        "✗".red(),
                        suite,
                        case.name.white().bold(),
                        step,
                        message
                    );
                }
            }
        }

        let totals = self.totals();
        let elapsed: u64 = self.suites.iter().map(|s| s.elapsed_ms).sum();
        let line = format!("{totals} in {:.2}s", elapsed as f64 / 1000.0);
        if self.is_success() {
            println!("\n{}\n", line.green().bold());
        } else {
            println!("\n{}\n", line.red().bold());
        }
    }
}
