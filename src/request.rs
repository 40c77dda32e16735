//! Per-request context.
//!
//! A [`Request`] is created when a route matches and is dropped once the
//! response is written. Exactly one pipeline owns it; gates mutate it in
//! place, the handler consumes it.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::method::Method;
use crate::middleware::auth::Identity;
use crate::middleware::validate::ValidationResult;

/// An incoming HTTP request plus everything the pipeline learns about it.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) payload: Value,
    pub(crate) params: HashMap<String, String>,
    pub(crate) identity: Option<Identity>,
    pub(crate) validation: ValidationResult,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        let payload = parse_payload(method, &body);
        Self {
            method,
            path,
            headers,
            body,
            payload,
            params,
            identity: None,
            validation: ValidationResult::default(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/products/:productId`, `req.param("productId")` on
    /// `/api/products/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The parsed JSON body. Always an object for an empty or malformed body.
    pub fn payload(&self) -> &Value { &self.payload }

    /// A single top-level body field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Deserialises the raw body into `T`.
    ///
    /// Fails with a single `body` validation error; no coercion is attempted.
    /// The parser's own message (with its line and column) is only logged.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            debug!(path = %self.path, "typed body rejected: {e}");
            let message = match e.classify() {
                Category::Data => "body has a field of the wrong type",
                Category::Syntax | Category::Eof | Category::Io => "body is not valid JSON",
            };
            ApiError::invalid("body", message)
        })
    }

    /// The caller resolved by the authentication gate, if it has run.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Validation errors accumulated so far by `Validate` gates.
    pub fn validation(&self) -> &ValidationResult { &self.validation }

    pub fn validation_mut(&mut self) -> &mut ValidationResult { &mut self.validation }
}

fn parse_payload(method: Method, body: &[u8]) -> Value {
    if !method.has_body() || body.is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            debug!("request body is not a JSON object");
            Value::Object(Map::new())
        }
        Err(e) => {
            debug!("request body is not valid JSON: {e}");
            Value::Object(Map::new())
        }
    }
}

#[cfg(test)]
pub(crate) fn test_request(method: Method, body: &str) -> Request {
    Request::new(
        method,
        "/test".to_owned(),
        HeaderMap::new(),
        Bytes::copy_from_slice(body.as_bytes()),
        HashMap::new(),
    )
}
