//! Test runner implementation
//!
//! Executes test suites against the API under test, one case at a time.
//! Each case gets its own variable scope, so cases never share state.

use std::time::Instant;

use colored::Colorize;

use crate::common::{Error, Result};
use crate::http::{parse_method, ApiClient, ObservedResponse, PreparedBody, PreparedRequest};

use super::assertions::check_response;
use super::config::{Category, RequestBody, RequestSpec, TestCase, TestStep, TestSuite};
use super::fixtures::Fixtures;
use super::report::{CaseOutcome, CaseReport, RunSummary, SuiteReport};
use super::template::{render, render_value, Variables};

/// Options controlling a run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print every step, not just case results
    pub verbose: bool,
    /// Suppress all terminal output (used for JSON reports)
    pub quiet: bool,
    /// Only run cases whose name contains this substring
    pub filter: Option<String>,
    /// Only run cases in these categories (all when empty)
    pub categories: Vec<Category>,
    /// Count XPASS as a failure
    pub strict_xfail: bool,
    /// Stop a suite at its first failing case
    pub fail_fast: bool,
}

impl RunOptions {
    /// Whether a case passes the name and category filters
    pub fn selects(&self, case: &TestCase) -> bool {
        let name_ok = self
            .filter
            .as_deref()
            .map_or(true, |needle| case.name.contains(needle));
        let category_ok = self.categories.is_empty() || self.categories.contains(&case.category);
        name_ok && category_ok
    }
}

/// A step failure: 1-based step number plus the error
struct StepFailure {
    step: usize,
    error: Error,
}

/// Run several suites and collect their reports
pub async fn run_suites(
    client: &ApiClient,
    suites: &[TestSuite],
    fixtures: &Fixtures,
    options: &RunOptions,
) -> RunSummary {
    let mut summary = RunSummary::new(client.base_url().as_str());
    for suite in suites {
        let report = run_suite(client, suite, fixtures, options).await;
        let failed = !report.is_success();
        summary.suites.push(report);
        if failed && options.fail_fast {
            break;
        }
    }
    summary
}

/// Run a single suite
pub async fn run_suite(
    client: &ApiClient,
    suite: &TestSuite,
    fixtures: &Fixtures,
    options: &RunOptions,
) -> SuiteReport {
    let console = Console::new(options);
    let started = Instant::now();

    console.line(format!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    ));
    if let Some(desc) = &suite.description {
        console.line(format!("  {}", desc.dimmed()));
    }

    let mut cases = Vec::new();
    for case in suite.cases.iter().filter(|c| options.selects(c)) {
        let report = run_case(client, case, fixtures, options, &console).await;
        tracing::info!(
            suite = %suite.name,
            case = %case.name,
            outcome = report.outcome.label(),
            elapsed_ms = report.elapsed_ms,
            "case finished"
        );
        let stop = options.fail_fast && report.outcome.is_failure();
        cases.push(report);
        if stop {
            console.line(format!("  {}", "Stopping after first failure".yellow()));
            break;
        }
    }

    SuiteReport {
        suite: suite.name.clone(),
        cases,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Run one case and classify its outcome
async fn run_case(
    client: &ApiClient,
    case: &TestCase,
    fixtures: &Fixtures,
    options: &RunOptions,
    console: &Console,
) -> CaseReport {
    let steps_total = case.steps.len();
    let started = Instant::now();

    if let Some(reason) = &case.skip {
        console.case_line("-".yellow(), &case.name, format!("skipped: {reason}").yellow());
        return CaseReport {
            name: case.name.clone(),
            category: case.category,
            outcome: CaseOutcome::Skipped {
                reason: reason.clone(),
            },
            steps_run: 0,
            steps_total,
            elapsed_ms: 0,
        };
    }

    if console.verbose {
        console.line(format!(
            "\n  {} {}",
            case.name.white().bold(),
            format!("[{}]", case.category).dimmed()
        ));
        if let Some(desc) = &case.description {
            console.line(format!("    {}", desc.dimmed()));
        }
    }

    let result = execute_steps(client, case, fixtures, console).await;
    let steps_run = match &result {
        Ok(()) => steps_total,
        Err(failure) => failure.step,
    };
    let outcome = classify(case, result, options.strict_xfail);

    match &outcome {
        CaseOutcome::Passed => console.case_line("✓".green(), &case.name, "".normal()),
        CaseOutcome::Failed { step, message } => console.case_line(
            "✗".red(),
            &case.name,
            format!("step {step}: {message}").red(),
        ),
        CaseOutcome::XFailed { reason, .. } => {
            console.case_line("x".yellow(), &case.name, format!("xfail: {reason}").yellow())
        }
        CaseOutcome::XPassed { reason } => console.case_line(
            "!".yellow().bold(),
            &case.name,
            format!("XPASS (expected failure: {reason})").yellow(),
        ),
        CaseOutcome::Skipped { .. } => {}
    }

    CaseReport {
        name: case.name.clone(),
        category: case.category,
        outcome,
        steps_run,
        steps_total,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Map a case result onto an outcome, honouring its xfail marker
fn classify(
    case: &TestCase,
    result: std::result::Result<(), StepFailure>,
    strict_xfail: bool,
) -> CaseOutcome {
    match (result, &case.xfail) {
        (Ok(()), None) => CaseOutcome::Passed,
        (Ok(()), Some(reason)) if strict_xfail => CaseOutcome::Failed {
            step: case.steps.len(),
            message: format!("[XPASS(strict)] {reason}"),
        },
        (Ok(()), Some(reason)) => CaseOutcome::XPassed {
            reason: reason.clone(),
        },
        (Err(failure), Some(reason)) if !failure.error.is_scenario_defect() => {
            CaseOutcome::XFailed {
                reason: reason.clone(),
                message: describe(&failure.error),
            }
        }
        (Err(failure), _) => CaseOutcome::Failed {
            step: failure.step,
            message: describe(&failure.error),
        },
    }
}

fn describe(error: &Error) -> String {
    match error {
        Error::Assertion(message) => message.clone(),
        other => other.to_string(),
    }
}

async fn execute_steps(
    client: &ApiClient,
    case: &TestCase,
    fixtures: &Fixtures,
    console: &Console,
) -> std::result::Result<(), StepFailure> {
    let mut vars = Variables::new();
    for (i, step) in case.steps.iter().enumerate() {
        let step_num = i + 1;
        if let Err(error) = execute_step(client, step, step_num, fixtures, &mut vars, console).await
        {
            if console.verbose {
                console.line(format!("    {} Step {}: {}", "✗".red(), step_num, describe(&error)));
            }
            return Err(StepFailure {
                step: step_num,
                error,
            });
        }
    }
    Ok(())
}

/// Execute a single test step
async fn execute_step(
    client: &ApiClient,
    step: &TestStep,
    step_num: usize,
    fixtures: &Fixtures,
    vars: &mut Variables,
    console: &Console,
) -> Result<()> {
    match step {
        TestStep::Request {
            request,
            expect,
            capture,
        } => {
            let prepared = prepare_request(request, fixtures, vars)?;
            let response = client.send(&prepared).await?;

            if let Some(expect) = expect {
                check_response(expect, &response, prepared.body.as_json(), vars)?;
            }

            for (name, spec) in capture {
                let value = response
                    .json
                    .as_ref()
                    .and_then(|doc| doc.pointer(&spec.pointer))
                    .cloned()
                    .or_else(|| spec.default.clone())
                    .ok_or_else(|| {
                        Error::assertion(format!(
                            "Cannot capture '{name}': response has no field '{}'",
                            spec.pointer
                        ))
                    })?;
                tracing::debug!(variable = %name, value = %value, "captured");
                vars.insert(name.clone(), value);
            }

            console.step_line(step_num, &prepared, &response);
            Ok(())
        }
        TestStep::Repeat {
            times,
            request,
            expect,
            consistent,
        } => {
            let prepared = prepare_request(request, fixtures, vars)?;
            let mut first: Option<ObservedResponse> = None;

            for attempt in 1..=*times {
                let response = client.send(&prepared).await?;
                if let Some(expect) = expect {
                    check_response(expect, &response, prepared.body.as_json(), vars)
                        .map_err(|e| e.within(format!("attempt {attempt}")))?;
                }
                if *consistent {
                    if let Some(reference) = &first {
                        if !same_payload(reference, &response) {
                            return Err(Error::assertion(format!(
                                "Response {attempt} differs from response 1"
                            )));
                        }
                    }
                }
                console.step_line(step_num, &prepared, &response);
                if first.is_none() {
                    first = Some(response);
                }
            }
            Ok(())
        }
    }
}

fn same_payload(a: &ObservedResponse, b: &ObservedResponse) -> bool {
    match (&a.json, &b.json) {
        (Some(x), Some(y)) => x == y,
        _ => a.body == b.body,
    }
}

/// Resolve templates and fixtures into a concrete request
pub fn prepare_request(
    spec: &RequestSpec,
    fixtures: &Fixtures,
    vars: &Variables,
) -> Result<PreparedRequest> {
    let method = parse_method(&spec.method)?;
    let path = render(&spec.path, vars)?;

    let query = spec
        .query
        .iter()
        .map(|(k, v)| Ok((k.clone(), render(v, vars)?)))
        .collect::<Result<Vec<_>>>()?;
    let headers = spec
        .headers
        .iter()
        .map(|(k, v)| Ok((k.clone(), render(v, vars)?)))
        .collect::<Result<Vec<_>>>()?;

    let body = match &spec.body {
        None => PreparedBody::Empty,
        Some(RequestBody::Json(value)) => PreparedBody::Json(render_value(value, vars)?),
        Some(RequestBody::Fixture(name)) => PreparedBody::Json(fixtures.get(name)?),
        Some(RequestBody::Raw(text)) => PreparedBody::Raw(text.clone()),
    };

    Ok(PreparedRequest {
        method,
        path,
        query,
        headers,
        body,
    })
}

/// Terminal output, disabled entirely in quiet mode
struct Console {
    enabled: bool,
    verbose: bool,
}

impl Console {
    fn new(options: &RunOptions) -> Self {
        Self {
            enabled: !options.quiet,
            verbose: options.verbose && !options.quiet,
        }
    }

    fn line(&self, text: String) {
        if self.enabled {
            println!("{text}");
        }
    }

    fn case_line(
        &self,
        marker: colored::ColoredString,
        name: &str,
        detail: colored::ColoredString,
    ) {
        if !self.enabled {
            return;
        }
        if detail.is_empty() {
            println!("  {marker} {name}");
        } else {
            println!("  {marker} {name} {}", format!("({detail})").dimmed());
        }
    }

    fn step_line(&self, step_num: usize, request: &PreparedRequest, response: &ObservedResponse) {
        if self.verbose {
            println!(
                "    {} Step {}: {} {} {}",
                "✓".green(),
                step_num,
                request.describe().dimmed(),
                response.status.to_string().cyan(),
                format!("({}ms)", response.elapsed.as_millis()).dimmed()
            );
        }
    }
}
