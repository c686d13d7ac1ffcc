//! CLI command handling
//!
//! Resolves configuration and suites, dispatches to the runner and
//! formats output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::http::ApiClient;
use crate::testing::{self, Fixtures, RunOptions, TestSuite};

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when the command ran but reported failures.
pub async fn dispatch(command: Commands, config_file: Option<&Path>) -> Result<bool> {
    match command {
        Commands::Run {
            paths,
            suites,
            base_url,
            filter,
            categories,
            strict_xfail,
            fail_fast,
            json,
            verbose,
        } => {
            let mut config = Config::load_from(config_file)?;
            config.override_base_url(base_url);

            let selected = resolve_suites(&paths, &suites)?;
            let fixtures = Fixtures::with_overrides(&config.fixtures);
            let client = ApiClient::new(&config.api)?;

            let options = RunOptions {
                verbose,
                quiet: json,
                filter,
                categories,
                strict_xfail: strict_xfail || config.runner.strict_xfail,
                fail_fast: fail_fast || config.runner.fail_fast,
            };

            if !json {
                println!(
                    "{} {}",
                    "Target:".cyan(),
                    client.base_url().as_str().white().bold()
                );
            }

            let summary = testing::run_suites(&client, &selected, &fixtures, &options).await;

            if json {
                println!("{}", summary.to_json()?);
            } else {
                summary.print();
            }

            Ok(summary.is_success())
        }

        Commands::List { paths, suites } => {
            let selected = resolve_suites(&paths, &suites)?;
            for suite in &selected {
                print_suite(suite);
            }
            Ok(true)
        }

        Commands::Config => {
            let config = Config::load_from(config_file)?;
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}

/// Collect the suites named on the command line
///
/// With neither files nor suite names, every built-in suite is used.
pub fn resolve_suites(paths: &[PathBuf], names: &[String]) -> Result<Vec<TestSuite>> {
    if paths.is_empty() && names.is_empty() {
        return testing::builtin_suites();
    }

    let mut suites = Vec::new();
    for name in names {
        suites.push(testing::builtin_suite(name)?);
    }
    for path in paths {
        for file in suite_files(path)? {
            suites.push(TestSuite::from_file(&file)?);
        }
    }
    Ok(suites)
}

/// Expand a directory into its YAML files (sorted); files pass through
fn suite_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let file = entry?.path();
        let is_yaml = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false);
        if is_yaml && file.is_file() {
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(Error::Config(format!(
            "No *.yaml suite files found in '{}'",
            path.display()
        )));
    }
    Ok(files)
}

fn print_suite(suite: &TestSuite) {
    println!(
        "{} {}",
        suite.name.white().bold(),
        format!("({} cases)", suite.cases.len()).dimmed()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }
    for case in &suite.cases {
        let mut line = format!("  {:<13} {}", format!("[{}]", case.category), case.name);
        if let Some(reason) = &case.xfail {
            line.push_str(&format!(" {}", format!("xfail: {reason}").yellow()));
        }
        if let Some(reason) = &case.skip {
            line.push_str(&format!(" {}", format!("skip: {reason}").yellow()));
        }
        println!("{line}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = "name: local\ncases:\n  - name: ping\n    steps:\n      - action: request\n        method: GET\n        path: /users\n";

    #[test]
    fn test_defaults_to_builtin_suites() {
        let suites = resolve_suites(&[], &[]).unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["smoke", "scenarios"]);
    }

    #[test]
    fn test_named_builtin_suite() {
        let suites = resolve_suites(&[], &["smoke".to_string()]).unwrap();
        assert_eq!(suites.len(), 1);
        assert!(matches!(
            resolve_suites(&[], &["missing".to_string()]).unwrap_err(),
            Error::UnknownSuite { .. }
        ));
    }

    #[test]
    fn test_directory_of_suites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), SUITE.replace("local", "second")).unwrap();
        std::fs::write(dir.path().join("a.yml"), SUITE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let suites = resolve_suites(&[dir.path().to_path_buf()], &[]).unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["local", "second"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_suites(&[dir.path().to_path_buf()], &[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
