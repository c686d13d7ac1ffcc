//! Named sample payloads available to scenarios

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::common::{Error, Result};

/// Registry of named JSON payloads
///
/// Lookups hand out clones, so a case can never observe another case's
/// modifications.
#[derive(Debug, Clone)]
pub struct Fixtures {
    payloads: BTreeMap<String, Value>,
}

impl Default for Fixtures {
    fn default() -> Self {
        let mut payloads = BTreeMap::new();
        payloads.insert(
            "valid_user".to_string(),
            json!({
                "name": "John Doe",
                "username": "johndoe",
                "email": "john.doe@example.com"
            }),
        );
        payloads.insert(
            "valid_post".to_string(),
            json!({
                "title": "Test Post",
                "body": "This is a test post content",
                "userId": 1
            }),
        );
        Self { payloads }
    }
}

impl Fixtures {
    /// Built-in payloads overlaid with configured ones
    pub fn with_overrides(overrides: &BTreeMap<String, Value>) -> Self {
        let mut fixtures = Self::default();
        for (name, payload) in overrides {
            fixtures.payloads.insert(name.clone(), payload.clone());
        }
        fixtures
    }

    /// Fetch a copy of a payload by name
    pub fn get(&self, name: &str) -> Result<Value> {
        self.payloads
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFixture(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fixtures() {
        let fixtures = Fixtures::default();
        let user = fixtures.get("valid_user").unwrap();
        assert_eq!(user["email"], "john.doe@example.com");
        let post = fixtures.get("valid_post").unwrap();
        assert_eq!(post["userId"], 1);
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut overrides = BTreeMap::new();
        overrides.insert("valid_user".to_string(), json!({"name": "Ada"}));
        overrides.insert("admin".to_string(), json!({"role": "admin"}));

        let fixtures = Fixtures::with_overrides(&overrides);
        assert_eq!(fixtures.get("valid_user").unwrap(), json!({"name": "Ada"}));
        assert_eq!(fixtures.get("admin").unwrap()["role"], "admin");
        assert!(fixtures.get("valid_post").is_ok());
    }

    #[test]
    fn test_copies_are_independent() {
        let fixtures = Fixtures::default();
        let mut first = fixtures.get("valid_user").unwrap();
        first["name"] = json!("Mutated");
        assert_eq!(fixtures.get("valid_user").unwrap()["name"], "John Doe");
    }

    #[test]
    fn test_unknown_fixture() {
        let err = Fixtures::default().get("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownFixture(name) if name == "nope"));
    }
}
