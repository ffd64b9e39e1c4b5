//! Sequential call chains.
//!
//! # Overview
//! A chain is an initial request followed by an ordered list of builders.
//! Builder `i` receives the response of call `i - 1` and returns the request
//! for call `i`. Calls run strictly one after another; the first failure
//! ends the chain and no later builder is invoked.
//!
//! # Design
//! The chain is a single `async` loop. Each step is awaited before the next
//! builder runs, so no thread is parked waiting on a nested call and the
//! only response kept alive is the immediately previous one. Intermediate
//! responses are decoded as `RawResponse`; only the last call is decoded as
//! the caller's final type.

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::convert::{convert_response, ChainResponse};
use crate::error::{ApiError, ChainError};
use crate::executor::Executor;
use crate::http::{ApiResponse, HttpRequest, RawResponse};
use crate::transport::Transport;

/// Produces the next request of a chain from the previous response.
///
/// Implemented for every `Fn(&RawResponse) -> Result<HttpRequest, ApiError>`
/// closure. An error returned here fails the chain at this builder's step.
pub trait NextRequest: Send + Sync {
    fn next_request(&self, previous: &RawResponse) -> Result<HttpRequest, ApiError>;
}

impl<F> NextRequest for F
where
    F: Fn(&RawResponse) -> Result<HttpRequest, ApiError> + Send + Sync,
{
    fn next_request(&self, previous: &RawResponse) -> Result<HttpRequest, ApiError> {
        self(previous)
    }
}

pub type NextRequestBuilder = Box<dyn NextRequest>;

/// Box an infallible builder closure.
pub fn builder<F>(f: F) -> NextRequestBuilder
where
    F: Fn(&RawResponse) -> HttpRequest + Send + Sync + 'static,
{
    Box::new(move |previous: &RawResponse| Ok::<_, ApiError>(f(previous)))
}

/// Box a fallible builder closure.
pub fn try_builder<F>(f: F) -> NextRequestBuilder
where
    F: Fn(&RawResponse) -> Result<HttpRequest, ApiError> + Send + Sync + 'static,
{
    Box::new(f)
}

impl<T: Transport> Executor<T> {
    /// Run `initial`, then one call per builder, and return the last
    /// response decoded as `F`.
    ///
    /// With no builders the initial response is converted to `F` according
    /// to the configured `ConversionPolicy`.
    #[instrument(
        skip_all,
        fields(chain_id = %Uuid::new_v4(), calls = builders.len() + 1)
    )]
    pub async fn execute_sequential_calls<F: DeserializeOwned>(
        &self,
        initial: HttpRequest,
        builders: &[NextRequestBuilder],
    ) -> Result<ChainResponse<F>, ChainError> {
        info!(url = %initial.url, "starting chain");
        let result = self.run_chain(initial, builders).await;
        match &result {
            Ok(response) => info!(status = response.status(), "chain completed"),
            Err(e) => error!(step = e.step(), error = %e, "chain aborted"),
        }
        result
    }

    async fn run_chain<F: DeserializeOwned>(
        &self,
        initial: HttpRequest,
        builders: &[NextRequestBuilder],
    ) -> Result<ChainResponse<F>, ChainError> {
        debug!(url = %initial.url, "executing initial call");
        let mut previous = self.run_step::<serde_json::Value>(0, &initial).await?;

        let Some((last, intermediate)) = builders.split_last() else {
            return convert_response(previous, self.config.conversion);
        };

        for (index, next) in intermediate.iter().enumerate() {
            let step = index + 1;
            let request = next
                .next_request(&previous)
                .map_err(|e| ChainError::at(step, e))?;
            debug!(step, url = %request.url, "executing intermediate call");
            previous = self.run_step(step, &request).await?;
        }

        let step = builders.len();
        let request = last
            .next_request(&previous)
            .map_err(|e| ChainError::at(step, e))?;
        drop(previous);
        debug!(step, url = %request.url, "executing final call");
        let response = self.run_step::<F>(step, &request).await?;
        Ok(ChainResponse::Typed(response))
    }

    /// Execute one link. Any failure, including a non-2xx status, ends the
    /// chain at `step`.
    async fn run_step<B: DeserializeOwned>(
        &self,
        step: usize,
        request: &HttpRequest,
    ) -> Result<ApiResponse<B>, ChainError> {
        self.execute_single_call::<B>(request)
            .await
            .map_err(|e| ChainError::at(step, e))
    }
}
