//! Request handlers for the mock API
//!
//! Behaviour follows the public service, defects included: PUT on an
//! unknown id fails with 500, writes are echoed but never stored, and POST
//! to an item path is answered with 404 rather than 405.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use super::data::{Resource, Store};

pub type SharedStore = Arc<Store>;

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

/// Numeric ids only; anything else is treated as a missing record
fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

/// Decode a request body, treating an empty body as `{}`
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed body");
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Unexpected token in JSON: {e}") })),
            )
                .into_response())
        }
    }
}

pub async fn list(
    resource: Resource,
    State(store): State<SharedStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let records = store
        .all(resource)
        .iter()
        .filter(|record| matches_filters(record, &params))
        .cloned()
        .collect::<Vec<_>>();
    tracing::debug!(resource = resource.as_str(), count = records.len(), "list");
    Json(Value::Array(records)).into_response()
}

/// Every query parameter must equal the record's field, compared as text
fn matches_filters(record: &Value, params: &HashMap<String, String>) -> bool {
    params.iter().all(|(key, expected)| match record.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

pub async fn show(
    resource: Resource,
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Response {
    match parse_id(&raw_id).and_then(|id| store.find(resource, id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => not_found(),
    }
}

pub async fn create(resource: Resource, State(store): State<SharedStore>, body: Bytes) -> Response {
    let mut record = match parse_body(&body) {
        Ok(map) => map,
        Err(response) => return response,
    };
    let id = store.next_id(resource);
    record.insert("id".to_string(), json!(id));
    tracing::debug!(resource = resource.as_str(), id, "create (not persisted)");
    (StatusCode::CREATED, Json(Value::Object(record))).into_response()
}

pub async fn replace(
    resource: Resource,
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Response {
    let mut record = match parse_body(&body) {
        Ok(map) => map,
        Err(response) => return response,
    };
    let Some(id) = parse_id(&raw_id).filter(|id| store.find(resource, *id).is_some()) else {
        tracing::debug!(resource = resource.as_str(), raw_id = %raw_id, "replace of unknown record");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "TypeError: Cannot read properties of undefined (reading 'id')",
        )
            .into_response();
    };
    record.insert("id".to_string(), json!(id));
    Json(Value::Object(record)).into_response()
}

pub async fn update(
    resource: Resource,
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Response {
    let changes = match parse_body(&body) {
        Ok(map) => map,
        Err(response) => return response,
    };
    let Some(existing) = parse_id(&raw_id).and_then(|id| store.find(resource, id)) else {
        return not_found();
    };
    let mut merged = existing.clone();
    if let Value::Object(fields) = &mut merged {
        for (key, value) in changes {
            if key != "id" {
                fields.insert(key, value);
            }
        }
    }
    Json(merged).into_response()
}

pub async fn remove(resource: Resource, Path(raw_id): Path<String>) -> Response {
    tracing::debug!(resource = resource.as_str(), raw_id = %raw_id, "delete (not persisted)");
    Json(json!({})).into_response()
}

pub async fn user_posts(State(store): State<SharedStore>, Path(raw_id): Path<String>) -> Response {
    let posts = parse_id(&raw_id)
        .map(|id| store.posts_by_user(id))
        .unwrap_or_default();
    Json(Value::Array(posts)).into_response()
}

pub async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert!(parse_body(&Bytes::from_static(b"")).unwrap().is_empty());
        assert!(parse_body(&Bytes::from_static(b"  \n")).unwrap().is_empty());
        let map = parse_body(&Bytes::from_static(br#"{"name":"x"}"#)).unwrap();
        assert_eq!(map["name"], "x");
        let err = parse_body(&Bytes::from_static(b"this is not valid json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_matches_filters() {
        let post = json!({"userId": 1, "title": "t"});
        let mut params = HashMap::new();
        params.insert("userId".to_string(), "1".to_string());
        assert!(matches_filters(&post, &params));
        params.insert("userId".to_string(), "2".to_string());
        assert!(!matches_filters(&post, &params));
        params.clear();
        params.insert("title".to_string(), "t".to_string());
        assert!(matches_filters(&post, &params));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1' OR '1'='1"), None);
    }
}
