//! HTTP value types shared by transports, the executor and request builders.
//!
//! # Design
//! Requests and responses are plain, immutable data. A transport turns an
//! `HttpRequest` into a raw `HttpResponse` (status, headers, undecoded text);
//! the executor then decodes it into an `ApiResponse<T>`. Responses whose
//! final type is not known yet travel through the chain as `RawResponse`,
//! i.e. with an opaque `serde_json::Value` body.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP method for a request.
///
/// Only `Get` and `Post` are dispatched by the executor; the remaining
/// variants are accepted when building requests and rejected with
/// `ApiError::UnsupportedMethod` at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(format!("unknown HTTP method: {other}")),
        }
    }
}

/// One API request described as plain data.
///
/// Built by the caller for the first call of a chain, and by a
/// `NextRequest` builder for every later call.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(HttpMethod::Post, url)
        }
    }

    /// Build a POST request whose body is `input` encoded as JSON.
    pub fn post_json<S: Serialize>(url: impl Into<String>, input: &S) -> Result<Self, ApiError> {
        let body = serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self::post(url, body))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A response exactly as a transport received it: nothing decoded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Response headers with lower-cased names.
///
/// Inserting a name that is already present appends the value, separated by
/// `", "`, the way repeated HTTP header lines are folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value.as_ref());
        }
        headers
    }
}

/// A decoded API response.
///
/// `body` is `None` when the server sent an empty body (e.g. `204`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub headers: Headers,
    pub body: Option<T>,
}

/// Response whose body type is not known yet: the opaque link between two
/// calls of a chain.
pub type RawResponse = ApiResponse<Value>;

impl<T> ApiResponse<T> {
    pub fn new(status: u16, headers: Headers, body: Option<T>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn map_body<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            headers: self.headers,
            body: self.body.map(f),
        }
    }
}

impl RawResponse {
    /// Look up a top-level field of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(name))
    }
}
