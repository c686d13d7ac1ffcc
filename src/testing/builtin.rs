//! Suites shipped inside the binary

use crate::common::{Error, Result};

use super::config::TestSuite;

/// Name and YAML source of each built-in suite
const BUILTIN: &[(&str, &str)] = &[
    ("smoke", include_str!("../../suites/smoke.yaml")),
    ("scenarios", include_str!("../../suites/scenarios.yaml")),
];

/// Names of the built-in suites, in run order
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}

/// Parse every built-in suite
pub fn builtin_suites() -> Result<Vec<TestSuite>> {
    BUILTIN
        .iter()
        .map(|(name, source)| TestSuite::from_yaml(name, source))
        .collect()
}

/// Parse one built-in suite by name
pub fn builtin_suite(name: &str) -> Result<TestSuite> {
    let (_, source) = BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| Error::UnknownSuite {
            name: name.to_string(),
            available: builtin_names().collect::<Vec<_>>().join(", "),
        })?;
    TestSuite::from_yaml(name, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ObservedResponse;
    use crate::testing::assertions::check_response;
    use crate::testing::config::{Category, ResponseExpectation, TestStep};
    use crate::testing::template::Variables;
    use reqwest::header::HeaderMap;
    use serde_json::{json, Value};
    use std::time::Duration;

    #[test]
    fn test_builtin_suites_parse() {
        let suites = builtin_suites().unwrap();
        assert_eq!(suites.len(), 2);
        assert_eq!(suites[0].name, "smoke");
        assert_eq!(suites[0].cases.len(), 8);
        assert_eq!(suites[1].name, "scenarios");
    }

    #[test]
    fn test_scenarios_cover_every_category() {
        let suite = builtin_suite("scenarios").unwrap();
        for category in Category::ALL {
            assert!(
                suite.cases.iter().any(|c| c.category == category),
                "no {category} case"
            );
        }
    }

    #[test]
    fn test_known_defects_are_marked() {
        let suite = builtin_suite("scenarios").unwrap();
        let xfails: Vec<&str> = suite
            .cases
            .iter()
            .filter(|c| c.xfail.is_some())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            xfails,
            vec!["update_nonexistent_user", "create_update_delete_workflow"]
        );
    }

    fn expectation_of(suite: &TestSuite, case: &str) -> ResponseExpectation {
        let case = suite.cases.iter().find(|c| c.name == case).unwrap();
        match &case.steps[0] {
            TestStep::Request { expect, .. } => expect.clone().unwrap(),
            other => panic!("unexpected step {other:?}"),
        }
    }

    fn created(body: Value) -> ObservedResponse {
        ObservedResponse {
            status: 201,
            headers: HeaderMap::new(),
            body: serde_json::to_vec(&body).unwrap(),
            json: Some(body),
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_special_characters_accept_echo_or_sanitised_name() {
        let suite = builtin_suite("scenarios").unwrap();
        let expect = expectation_of(&suite, "create_user_special_characters");
        let vars = Variables::new();

        let echoed = created(json!({"id": 11, "name": "John <script>alert('xss')</script>"}));
        check_response(&expect, &echoed, None, &vars).unwrap();

        let sanitised = created(json!({"id": 11, "name": "John &lt;script&gt;alert('xss')&lt;/script&gt;"}));
        check_response(&expect, &sanitised, None, &vars).unwrap();

        assert!(check_response(&expect, &created(json!({"id": 11})), None, &vars).is_err());
    }

    #[test]
    fn test_unknown_builtin() {
        let err = builtin_suite("nightly").unwrap_err();
        assert!(matches!(err, Error::UnknownSuite { ref name, .. } if name == "nightly"));
        assert_eq!(
            err.to_string(),
            "Unknown suite 'nightly' (built-in suites: smoke, scenarios)"
        );
    }
}
