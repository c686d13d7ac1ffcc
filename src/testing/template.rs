//! `{var}` placeholder substitution
//!
//! Only identifier-shaped placeholders are substituted; any other brace
//! text is left untouched. `{{` and `}}` produce a literal `{` and `}`, so
//! `{{name}}` renders as the text `{name}`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::common::{Error, Result};

/// Variables captured during a case
pub type Variables = BTreeMap<String, Value>;

/// Substitute placeholders in a string
pub fn render(template: &str, vars: &Variables) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find(&['{', '}'][..]) {
        out.push_str(&rest[..at]);
        let brace = &rest[at..at + 1];
        let after = &rest[at + 1..];

        if let Some(unescaped) = after.strip_prefix(brace) {
            out.push_str(brace);
            rest = unescaped;
            continue;
        }
        if brace == "}" {
            out.push('}');
            rest = after;
            continue;
        }

        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                let name = &after[..close];
                let value = vars
                    .get(name)
                    .ok_or_else(|| Error::UnboundVariable(name.to_string()))?;
                out.push_str(&display(value));
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Substitute placeholders inside every string of a JSON value
///
/// A string consisting of exactly one placeholder is replaced by the
/// variable's value itself, keeping its JSON type.
pub fn render_value(value: &Value, vars: &Variables) -> Result<Value> {
    match value {
        Value::String(s) => {
            if let Some(name) = sole_placeholder(s) {
                return vars
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UnboundVariable(name.to_string()));
            }
            Ok(Value::String(render(s, vars)?))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, vars))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                rendered.insert(key.clone(), render_value(item, vars)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}

fn sole_placeholder(s: &str) -> Option<&str> {
    let name = s.strip_prefix('{')?.strip_suffix('}')?;
    is_identifier(name).then_some(name)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Variables {
        let mut vars = Variables::new();
        vars.insert("user_id".to_string(), json!(11));
        vars.insert("name".to_string(), json!("Jane"));
        vars
    }

    #[test]
    fn test_render_path() {
        assert_eq!(render("/users/{user_id}", &vars()).unwrap(), "/users/11");
        assert_eq!(render("{name}-{user_id}", &vars()).unwrap(), "Jane-11");
    }

    #[test]
    fn test_non_identifier_braces_untouched() {
        let raw = r#"{"name": "x"} and {} and {1}"#;
        assert_eq!(render(raw, &vars()).unwrap(), raw);
        assert_eq!(render("trailing {", &vars()).unwrap(), "trailing {");
    }

    #[test]
    fn test_doubled_braces_are_literal() {
        assert_eq!(render("{{user_id}}", &vars()).unwrap(), "{user_id}");
        assert_eq!(render("{{{user_id}}}", &vars()).unwrap(), "{11}");
        assert_eq!(render("a }} b {{", &vars()).unwrap(), "a } b {");
        assert_eq!(
            render_value(&json!("{{missing}}"), &vars()).unwrap(),
            json!("{missing}")
        );
    }

    #[test]
    fn test_unbound_variable() {
        let err = render("/users/{missing}", &vars()).unwrap_err();
        assert!(matches!(err, Error::UnboundVariable(name) if name == "missing"));
    }

    #[test]
    fn test_render_value_keeps_types() {
        let template = json!({
            "userId": "{user_id}",
            "title": "Post by {name}",
            "tags": ["{name}", 3]
        });
        assert_eq!(
            render_value(&template, &vars()).unwrap(),
            json!({"userId": 11, "title": "Post by Jane", "tags": ["Jane", 3]})
        );
    }
}
