//! Transport contract and the ureq-backed implementation.
//!
//! # Design
//! A transport executes exactly one HTTP exchange and hands back the raw
//! response. Non-2xx statuses are returned as data, not as errors: status
//! interpretation and body decoding belong to the executor, which is what
//! keeps transport-specific error types out of the caller's view. Only
//! failures that produce no response at all surface as `ApiError::Transport`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::TransportConfig;
use crate::error::ApiError;
use crate::http::HttpResponse;

/// Executes one request and returns one response.
///
/// Implementations must be stateless with respect to individual calls so a
/// single instance can be shared by any number of concurrent chains.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, ApiError>;

    /// `body` is already-encoded JSON text.
    async fn post(
        &self,
        url: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, ApiError> {
        (**self).get(url, headers).await
    }

    async fn post(
        &self,
        url: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        (**self).post(url, body, headers).await
    }
}

/// Blocking ureq agent driven from tokio's blocking pool.
///
/// `Clone` is cheap: the agent shares its connection pool between clones.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    default_headers: Arc<Vec<(String, String)>>,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            default_headers: Arc::new(config.default_headers),
        }
    }

    fn headers_for(&self, request_headers: &[(String, String)]) -> Vec<(String, String)> {
        self.default_headers
            .iter()
            .chain(request_headers)
            .cloned()
            .collect()
    }

    async fn run<F>(
        &self,
        method: &'static str,
        url: &str,
        call: F,
    ) -> Result<HttpResponse, ApiError>
    where
        F: FnOnce(ureq::Agent) -> Result<ureq::http::Response<ureq::Body>, ureq::Error>
            + Send
            + 'static,
    {
        debug!(method, url, "sending request");
        let agent = self.agent.clone();
        let url_owned = url.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let response = call(agent).map_err(|e| {
                ApiError::transport_with_source(format!("{method} {url_owned}"), e)
            })?;
            read_response(response)
        })
        .await
        .map_err(|e| {
            ApiError::transport_with_source(format!("{method} {url} was aborted"), e)
        })?;

        if let Err(e) = &result {
            error!(method, url, error = %e, "HTTP exchange failed");
        }
        result
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, ApiError> {
        let headers = self.headers_for(headers);
        let target = url.to_string();
        self.run("GET", url, move |agent| {
            let mut req = agent.get(&target);
            for (name, value) in &headers {
                req = req.header(name.as_str(), value.as_str());
            }
            req.call()
        })
        .await
    }

    async fn post(
        &self,
        url: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        let mut headers = self.headers_for(headers);
        let has_content_type = headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
        if body.is_some() && !has_content_type {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        let target = url.to_string();
        self.run("POST", url, move |agent| {
            let mut req = agent.post(&target);
            for (name, value) in &headers {
                req = req.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => req.send(body.as_bytes()),
                None => req.send_empty(),
            }
        })
        .await
    }
}

/// Collect status, headers and body text. Repeated headers are folded with
/// `", "`.
fn read_response(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<HttpResponse, ApiError> {
    let status = response.status().as_u16();
    let mut headers: Vec<(String, String)> = Vec::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match headers.iter_mut().find(|(k, _)| k == name.as_str()) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => headers.push((name.as_str().to_string(), value)),
        }
    }
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::transport_with_source("reading response body", e))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_precede_request_headers() {
        let config = TransportConfig::new().default_header("x-api-key", "k");
        let transport = UreqTransport::new(config);
        let headers = transport.headers_for(&[("x-trace".to_string(), "t".to_string())]);
        let names: Vec<&str> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["accept", "x-api-key", "x-trace"]);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Bind then drop a listener to obtain a port nothing listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::new(
            TransportConfig::new().timeout(Some(std::time::Duration::from_secs(2))),
        );
        let err = transport.get(&format!("http://{addr}/"), &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(err.status().is_none());
    }
}
