//! Response assertions
//!
//! Every check returns [`Error::Assertion`] describing the first mismatch.

use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::ObservedResponse;

use super::config::{BodyExpectation, FieldAssertion, JsonKind, ResponseExpectation};
use super::template::{render, render_value, Variables};

/// Longest body excerpt quoted in a failure message
const EXCERPT_LEN: usize = 200;

/// Check a response against its expectations
///
/// `sent` is the JSON body of the request, used by `equals_request`.
pub fn check_response(
    expect: &ResponseExpectation,
    response: &ObservedResponse,
    sent: Option<&Value>,
    vars: &Variables,
) -> Result<()> {
    if let Some(status) = &expect.status {
        if !status.matches(response.status) {
            return Err(Error::assertion(format!(
                "Expected status {}, got {}{}",
                status,
                response.status,
                excerpt_suffix(response)
            )));
        }
    }

    for (name, expected) in &expect.headers {
        let expected = render(expected, vars)?;
        match response.header(name) {
            Some(actual) if actual.contains(&expected) => {}
            Some(actual) => {
                return Err(Error::assertion(format!(
                    "Expected header '{name}' to contain '{expected}', got '{actual}'"
                )));
            }
            None => {
                return Err(Error::assertion(format!(
                    "Expected header '{name}' to be present"
                )));
            }
        }
    }

    if let Some(limit) = expect.max_elapsed_ms {
        let elapsed = response.elapsed.as_millis();
        if elapsed > u128::from(limit) {
            return Err(Error::assertion(format!(
                "Response took {elapsed}ms, exceeding the {limit}ms threshold"
            )));
        }
    }

    if let Some(body) = &expect.body {
        check_body(body, response, sent, vars)?;
    }

    if let Some(conditional) = &expect.when_status {
        if conditional.status.matches(response.status) {
            check_body(&conditional.body, response, sent, vars)?;
        }
    }

    Ok(())
}

/// Check a JSON body
pub fn check_body(
    expect: &BodyExpectation,
    response: &ObservedResponse,
    sent: Option<&Value>,
    vars: &Variables,
) -> Result<()> {
    let doc = response.json.as_ref().ok_or_else(|| {
        Error::assertion(format!(
            "Expected a JSON body, got '{}'",
            truncate(&response.text())
        ))
    })?;

    if let Some(kind) = expect.kind {
        let matches = match kind {
            JsonKind::Object => doc.is_object(),
            JsonKind::Array => doc.is_array(),
        };
        if !matches {
            return Err(Error::assertion(format!(
                "Expected a JSON {}, got {}",
                kind_name(kind),
                type_name(doc)
            )));
        }
    }

    if expect.non_empty {
        let empty = match doc {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        };
        if empty {
            return Err(Error::assertion("Expected a non-empty body"));
        }
    }

    for assertion in &expect.fields {
        check_field(doc, assertion, sent, vars)?;
    }

    if !expect.each.is_empty() {
        let items = doc.as_array().ok_or_else(|| {
            Error::assertion(format!(
                "Expected an array for per-item checks, got {}",
                type_name(doc)
            ))
        })?;
        for (index, item) in items.iter().enumerate() {
            for assertion in &expect.each {
                check_field(item, assertion, sent, vars)
                    .map_err(|e| e.within(format!("item {index}")))?;
            }
        }
    }

    Ok(())
}

/// Check one field of a JSON document
pub fn check_field(
    doc: &Value,
    assertion: &FieldAssertion,
    sent: Option<&Value>,
    vars: &Variables,
) -> Result<()> {
    let pointer = assertion.pointer.as_str();
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(Error::Config(format!(
            "JSON pointer '{pointer}' must be empty or start with '/'"
        )));
    }
    let actual = doc.pointer(pointer);

    match (assertion.exists, actual) {
        (Some(true), None) => {
            return Err(Error::assertion(format!("Expected field '{pointer}' to exist")));
        }
        (Some(false), Some(value)) => {
            return Err(Error::assertion(format!(
                "Expected field '{pointer}' to be absent, found {value}"
            )));
        }
        _ => {}
    }

    if let Some(expected) = &assertion.equals {
        let expected = render_value(expected, vars)?;
        expect_equal(pointer, actual, &expected)?;
    }

    if let Some(request_pointer) = &assertion.equals_request {
        let expected = sent.and_then(|body| body.pointer(request_pointer)).ok_or_else(|| {
            Error::Config(format!(
                "Request body has no field '{request_pointer}' to compare against"
            ))
        })?;
        expect_equal(pointer, actual, expected)?;
    }

    if let Some(needle) = &assertion.contains {
        let needle = render(needle, vars)?;
        match actual {
            Some(Value::String(s)) if s.contains(&needle) => {}
            Some(Value::String(s)) => {
                return Err(Error::assertion(format!(
                    "Expected field '{pointer}' to contain '{needle}', got '{}'",
                    truncate(s)
                )));
            }
            Some(other) => {
                return Err(Error::assertion(format!(
                    "Expected field '{pointer}' to be a string, got {}",
                    type_name(other)
                )));
            }
            None => {
                return Err(Error::assertion(format!("Expected field '{pointer}' to exist")));
            }
        }
    }

    Ok(())
}

fn expect_equal(pointer: &str, actual: Option<&Value>, expected: &Value) -> Result<()> {
    match actual {
        Some(value) if value == expected => Ok(()),
        Some(value) => Err(Error::assertion(format!(
            "Expected field '{pointer}' to equal {expected}, got {value}"
        ))),
        None => Err(Error::assertion(format!(
            "Expected field '{pointer}' to equal {expected}, but it is missing"
        ))),
    }
}

fn kind_name(kind: JsonKind) -> &'static str {
    match kind {
        JsonKind::Object => "object",
        JsonKind::Array => "array",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        text.to_string()
    } else {
        let head: String = text.chars().take(EXCERPT_LEN).collect();
        format!("{head}...")
    }
}

fn excerpt_suffix(response: &ObservedResponse) -> String {
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!(" (body: {})", truncate(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::config::{ConditionalBody, StatusExpectation};
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use serde_json::json;
    use std::time::Duration;

    fn response(status: u16, body: Value) -> ObservedResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let bytes = serde_json::to_vec(&body).unwrap();
        ObservedResponse {
            status,
            headers,
            body: bytes,
            json: Some(body),
            elapsed: Duration::from_millis(5),
        }
    }

    fn field(pointer: &str) -> FieldAssertion {
        FieldAssertion {
            pointer: pointer.to_string(),
            exists: None,
            equals: None,
            equals_request: None,
            contains: None,
        }
    }

    fn assertion_message(result: Result<()>) -> String {
        match result {
            Err(Error::Assertion(message)) => message,
            other => panic!("expected assertion failure, got {other:?}"),
        }
    }

    #[test]
    fn test_status_mismatch_quotes_body() {
        let expect = ResponseExpectation {
            status: Some(StatusExpectation::One(404)),
            ..Default::default()
        };
        let message = assertion_message(check_response(
            &expect,
            &response(200, json!({"id": 1})),
            None,
            &Variables::new(),
        ));
        assert_eq!(message, r#"Expected status 404, got 200 (body: {"id":1})"#);
    }

    #[test]
    fn test_header_contains() {
        let mut expect = ResponseExpectation::default();
        expect
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        check_response(&expect, &response(200, json!({})), None, &Variables::new()).unwrap();

        expect
            .headers
            .insert("x-request-id".to_string(), "abc".to_string());
        let message = assertion_message(check_response(
            &expect,
            &response(200, json!({})),
            None,
            &Variables::new(),
        ));
        assert_eq!(message, "Expected header 'x-request-id' to be present");
    }

    #[test]
    fn test_elapsed_threshold() {
        let expect = ResponseExpectation {
            max_elapsed_ms: Some(1),
            ..Default::default()
        };
        let message = assertion_message(check_response(
            &expect,
            &response(200, json!({})),
            None,
            &Variables::new(),
        ));
        assert!(message.contains("exceeding the 1ms threshold"));
    }

    #[test]
    fn test_kind_and_non_empty() {
        let expect = BodyExpectation {
            kind: Some(JsonKind::Array),
            non_empty: true,
            ..Default::default()
        };
        check_body(&expect, &response(200, json!([{"id": 1}])), None, &Variables::new()).unwrap();

        let message = assertion_message(check_body(
            &expect,
            &response(200, json!([])),
            None,
            &Variables::new(),
        ));
        assert_eq!(message, "Expected a non-empty body");

        let message = assertion_message(check_body(
            &expect,
            &response(200, json!({"id": 1})),
            None,
            &Variables::new(),
        ));
        assert_eq!(message, "Expected a JSON array, got object");
    }

    #[test]
    fn test_non_json_body() {
        let mut resp = response(500, json!(null));
        resp.body = b"<html>oops</html>".to_vec();
        resp.json = None;
        let message = assertion_message(check_body(
            &BodyExpectation::default(),
            &resp,
            None,
            &Variables::new(),
        ));
        assert_eq!(message, "Expected a JSON body, got '<html>oops</html>'");
    }

    #[test]
    fn test_field_exists_and_equals() {
        let doc = json!({"id": 1, "name": "Leanne"});
        let mut a = field("/id");
        a.equals = Some(json!(1));
        check_field(&doc, &a, None, &Variables::new()).unwrap();

        let mut b = field("/email");
        b.exists = Some(true);
        assert_eq!(
            assertion_message(check_field(&doc, &b, None, &Variables::new())),
            "Expected field '/email' to exist"
        );

        let mut c = field("/name");
        c.exists = Some(false);
        assert!(check_field(&doc, &c, None, &Variables::new()).is_err());

        let mut d = field("/id");
        d.equals = Some(json!(2));
        assert_eq!(
            assertion_message(check_field(&doc, &d, None, &Variables::new())),
            "Expected field '/id' to equal 2, got 1"
        );
    }

    #[test]
    fn test_equals_uses_variables() {
        let mut vars = Variables::new();
        vars.insert("user_id".to_string(), json!(3));
        let mut a = field("/userId");
        a.equals = Some(json!("{user_id}"));
        check_field(&json!({"userId": 3}), &a, None, &vars).unwrap();
    }

    #[test]
    fn test_equals_request() {
        let sent = json!({"name": "John Doe"});
        let mut a = field("/name");
        a.equals_request = Some("/name".to_string());
        check_field(&json!({"name": "John Doe", "id": 11}), &a, Some(&sent), &Variables::new())
            .unwrap();
        assert!(check_field(&json!({"name": "Other"}), &a, Some(&sent), &Variables::new()).is_err());

        a.equals_request = Some("/email".to_string());
        let err = check_field(&json!({"name": "x"}), &a, Some(&sent), &Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_contains() {
        let mut a = field("/name");
        a.contains = Some("<script>".to_string());
        check_field(
            &json!({"name": "John <script>alert('xss')</script>"}),
            &a,
            None,
            &Variables::new(),
        )
        .unwrap();
        assert!(check_field(&json!({"name": 5}), &a, None, &Variables::new()).is_err());
    }

    #[test]
    fn test_each_reports_index() {
        let expect = BodyExpectation {
            each: vec![FieldAssertion {
                equals: Some(json!(1)),
                ..field("/userId")
            }],
            ..Default::default()
        };
        let body = json!([{"userId": 1}, {"userId": 2}]);
        let message = assertion_message(check_body(
            &expect,
            &response(200, body),
            None,
            &Variables::new(),
        ));
        assert_eq!(message, "item 1: Expected field '/userId' to equal 1, got 2");
    }

    #[test]
    fn test_each_keeps_scenario_mistakes_distinct() {
        let body = json!([{"userId": 1}]);

        let unbound = BodyExpectation {
            each: vec![FieldAssertion {
                equals: Some(json!("{typo_var}")),
                ..field("/userId")
            }],
            ..Default::default()
        };
        let err = check_body(&unbound, &response(200, body.clone()), None, &Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnboundVariable(ref name) if name == "typo_var"));

        let bad_pointer = BodyExpectation {
            each: vec![FieldAssertion {
                exists: Some(true),
                ..field("userId")
            }],
            ..Default::default()
        };
        let err = check_body(&bad_pointer, &response(200, body), None, &Variables::new())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_escaped_braces_compare_literally() {
        let mut a = field("/template");
        a.equals = Some(json!("{{status}}"));
        check_field(&json!({"template": "{status}"}), &a, None, &Variables::new()).unwrap();

        let mut b = field("/template");
        b.contains = Some("{{id}}".to_string());
        check_field(&json!({"template": "/users/{id}"}), &b, None, &Variables::new()).unwrap();
    }

    #[test]
    fn test_when_status_only_applies_to_matching_status() {
        let expect = ResponseExpectation {
            when_status: Some(ConditionalBody {
                status: StatusExpectation::AnyOf(vec![200, 201]),
                body: BodyExpectation {
                    fields: vec![FieldAssertion {
                        exists: Some(true),
                        ..field("/name")
                    }],
                    ..Default::default()
                },
            }),
            ..Default::default()
        };
        check_response(&expect, &response(400, json!({})), None, &Variables::new()).unwrap();
        assert!(check_response(&expect, &response(201, json!({})), None, &Variables::new()).is_err());
    }

    #[test]
    fn test_bad_pointer_is_config_error() {
        let a = field("name");
        let err = check_field(&json!({}), &a, None, &Variables::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
