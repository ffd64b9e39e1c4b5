//! Error types for single calls and for whole chains.
//!
//! # Design
//! `ApiError` is the uniform failure of one call: whatever went wrong inside
//! a transport is re-wrapped here, so callers never see transport-specific
//! error types. `ChainError` adds which link of the chain broke. Both expose
//! the HTTP status and raw body of the failing call when there was one.

use std::time::Duration;

use thiserror::Error;

use crate::http::HttpMethod;

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside `200..300`.
    #[error("request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// The request method is not in the dispatched set (`GET`, `POST`).
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(HttpMethod),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed for HTTP {status} response: {message}")]
    Deserialization {
        status: u16,
        body: String,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("call did not complete within {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status of the failing response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } | ApiError::Deserialization { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Raw body of the failing response, if the server answered at all.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::RequestFailed { body, .. } | ApiError::Deserialization { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

/// Failure of a sequential chain, tagged with the link that broke.
///
/// Steps are numbered from 0: step 0 is the initial request, step `i` is the
/// request produced by the `i`-th builder.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("initial call failed: {0}")]
    Initial(#[source] ApiError),

    #[error("call {step} of the chain failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: ApiError,
    },

    /// Only produced under `ConversionPolicy::Strict`.
    #[error("response with HTTP {status} could not be converted to the requested type: {message}")]
    Conversion {
        status: u16,
        body: String,
        message: String,
    },
}

impl ChainError {
    pub(crate) fn at(step: usize, source: ApiError) -> Self {
        if step == 0 {
            ChainError::Initial(source)
        } else {
            ChainError::Step { step, source }
        }
    }

    pub fn step(&self) -> usize {
        match self {
            ChainError::Initial(_) | ChainError::Conversion { .. } => 0,
            ChainError::Step { step, .. } => *step,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ChainError::Initial(e) | ChainError::Step { source: e, .. } => e.status(),
            ChainError::Conversion { status, .. } => Some(*status),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ChainError::Initial(e) | ChainError::Step { source: e, .. } => e.body(),
            ChainError::Conversion { body, .. } => Some(body),
        }
    }

    /// The underlying call failure, absent for conversion failures.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ChainError::Initial(e) | ChainError::Step { source: e, .. } => Some(e),
            ChainError::Conversion { .. } => None,
        }
    }
}
