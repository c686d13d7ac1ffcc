//! HTTP client for the API under test
//!
//! Wraps a single `reqwest::Client` configured with the JSON default
//! headers and a request timeout. Every response is fully buffered so the
//! runner can make repeated assertions against it.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;

use crate::common::config::ApiConfig;
use crate::common::{Error, Result};

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    /// No body at all
    Empty,
    /// Serialized as JSON
    Json(Value),
    /// Sent verbatim (used for malformed-payload checks)
    Raw(String),
}

impl PreparedBody {
    /// The JSON value that was sent, if any
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A fully-resolved request ready to be sent
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/users/1`
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Per-request headers; these win over the client defaults
    pub headers: Vec<(String, String)>,
    pub body: PreparedBody,
}

impl PreparedRequest {
    /// Short description used in logs and reports, e.g. `GET /users/1`
    pub fn describe(&self) -> String {
        if self.query.is_empty() {
            format!("{} {}", self.method, self.path)
        } else {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            format!("{} {}?{}", self.method, self.path, query.join("&"))
        }
    }
}

/// A buffered response
#[derive(Debug, Clone)]
pub struct ObservedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Parsed body, when the payload is valid JSON
    pub json: Option<Value>,
    /// Time from sending the request until the body was fully read
    pub elapsed: Duration,
}

impl ObservedResponse {
    /// Look up a header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Parse a method name accepted in scenario files
pub fn parse_method(name: &str) -> Result<Method> {
    match name.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        _ => Err(Error::InvalidMethod(name.to_string())),
    }
}

/// Client for the API under test
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            Error::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { inner, base_url })
    }

    /// The base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path and query against the base URL
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        let mut url = Url::parse(&joined).map_err(|e| Error::InvalidBaseUrl {
            url: joined.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and buffer the response
    pub async fn send(&self, request: &PreparedRequest) -> Result<ObservedResponse> {
        let url = self.url_for(&request.path, &request.query)?;
        let method = request.method.as_str();

        let mut builder = self.inner.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            builder = builder.header(name, value);
        }
        builder = match &request.body {
            PreparedBody::Empty => builder,
            PreparedBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            PreparedBody::Raw(text) => builder.body(text.clone()),
        };

        tracing::debug!(method, url = %url, "sending request");
        let start = Instant::now();

        let response = builder
            .send()
            .await
            .map_err(|e| Error::http(method, url.as_str(), e))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(method, url.as_str(), e))?
            .to_vec();
        let elapsed = start.elapsed();

        let json = if body.is_empty() {
            None
        } else {
            serde_json::from_slice(&body).ok()
        };

        tracing::debug!(
            method,
            url = %url,
            status,
            bytes = body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "received response"
        );

        Ok(ObservedResponse {
            status,
            headers,
            body,
            json,
            elapsed,
        })
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("PATCH").unwrap(), Method::PATCH);
        assert!(matches!(
            parse_method("TRACE").unwrap_err(),
            Error::InvalidMethod(_)
        ));
    }

    #[test]
    fn test_url_join_handles_slashes() {
        let c = client("http://localhost:3000/");
        assert_eq!(
            c.url_for("/users/1", &[]).unwrap().as_str(),
            "http://localhost:3000/users/1"
        );
        assert_eq!(
            c.url_for("posts", &[]).unwrap().as_str(),
            "http://localhost:3000/posts"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let c = client("http://localhost:3000/api/v1");
        assert_eq!(
            c.url_for("/users", &[]).unwrap().as_str(),
            "http://localhost:3000/api/v1/users"
        );
    }

    #[test]
    fn test_url_query_is_encoded() {
        let c = client("http://localhost:3000");
        let url = c
            .url_for("/posts", &[("userId".to_string(), "1 2".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/posts?userId=1+2");
    }

    #[test]
    fn test_url_path_is_percent_encoded() {
        let c = client("http://localhost:3000");
        let url = c.url_for("/users/1' OR '1'='1", &[]).unwrap();
        assert!(url.path().contains("%20OR%20"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_invalid_configured_header() {
        let mut config = ApiConfig::default();
        config
            .headers
            .insert("Bad Header".to_string(), "x".to_string());
        let err = ApiClient::new(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn test_describe_request() {
        let request = PreparedRequest {
            method: Method::GET,
            path: "/posts".to_string(),
            query: vec![("userId".to_string(), "1".to_string())],
            headers: Vec::new(),
            body: PreparedBody::Empty,
        };
        assert_eq!(request.describe(), "GET /posts?userId=1");
    }
}
