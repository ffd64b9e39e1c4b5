//! Single-call execution: method dispatch, status check and body decoding.

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::ChainConfig;
use crate::error::ApiError;
use crate::http::{ApiResponse, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Runs requests against a `Transport`, one at a time or as a sequential
/// chain (see `execute_sequential_calls`).
///
/// The executor holds no per-call state; one instance serves any number of
/// concurrent chains.
#[derive(Debug, Clone)]
pub struct Executor<T> {
    pub(crate) transport: T,
    pub(crate) config: ChainConfig,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ChainConfig::default())
    }

    pub fn with_config(transport: T, config: ChainConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute one request and decode its body as `B`.
    ///
    /// Non-2xx responses become `ApiError::RequestFailed`. An empty body
    /// decodes to `body: None` for any `B`.
    pub async fn execute_single_call<B: DeserializeOwned>(
        &self,
        request: &HttpRequest,
    ) -> Result<ApiResponse<B>, ApiError> {
        debug!(method = %request.method, url = %request.url, "executing call");
        let result = self.dispatch(request).await.and_then(decode::<B>);
        if let Err(e) = &result {
            error!(method = %request.method, url = %request.url, error = %e, "call failed");
        }
        result
    }

    async fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let exchange = async {
            match request.method {
                HttpMethod::Get => self.transport.get(&request.url, &request.headers).await,
                HttpMethod::Post => {
                    let body = request
                        .body
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()
                        .map_err(|e| ApiError::Serialization(e.to_string()))?;
                    self.transport.post(&request.url, body, &request.headers).await
                }
                other => Err(ApiError::UnsupportedMethod(other)),
            }
        };

        match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ApiError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

/// Map a raw response to a decoded one, rejecting non-2xx statuses.
fn decode<B: DeserializeOwned>(response: HttpResponse) -> Result<ApiResponse<B>, ApiError> {
    if !response.is_success() {
        return Err(ApiError::RequestFailed {
            status: response.status,
            body: response.body,
        });
    }

    let headers = response.headers.iter().map(|(k, v)| (k, v)).collect();
    let body = if response.body.trim().is_empty() {
        None
    } else {
        match serde_json::from_str(&response.body) {
            Ok(body) => Some(body),
            Err(e) => {
                return Err(ApiError::Deserialization {
                    status: response.status,
                    body: response.body,
                    message: e.to_string(),
                })
            }
        }
    };

    Ok(ApiResponse::new(response.status, headers, body))
}
