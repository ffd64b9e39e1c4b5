//! Conversion of an opaque response into the caller's final type.
//!
//! Only chains without builders need this: their single response was read
//! before the final type mattered. Whether a failed conversion is an error
//! or a pass-through is the caller's `ConversionPolicy`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::config::ConversionPolicy;
use crate::error::ChainError;
use crate::http::{ApiResponse, RawResponse};

/// Result of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainResponse<T> {
    /// The body decoded as the requested type.
    Typed(ApiResponse<T>),
    /// The body did not decode as the requested type and was passed through
    /// untouched under `ConversionPolicy::PassThrough`.
    Unconverted(RawResponse),
}

impl<T> ChainResponse<T> {
    pub fn status(&self) -> u16 {
        match self {
            ChainResponse::Typed(r) => r.status,
            ChainResponse::Unconverted(r) => r.status,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ChainResponse::Typed(_))
    }

    pub fn typed(self) -> Option<ApiResponse<T>> {
        match self {
            ChainResponse::Typed(r) => Some(r),
            ChainResponse::Unconverted(_) => None,
        }
    }

    pub fn into_typed(self) -> Result<ApiResponse<T>, RawResponse> {
        match self {
            ChainResponse::Typed(r) => Ok(r),
            ChainResponse::Unconverted(r) => Err(r),
        }
    }
}

/// Decode `response`'s body as `T`, keeping status and headers.
///
/// A missing body converts to `body: None` for every `T`.
pub fn convert_response<T: DeserializeOwned>(
    response: RawResponse,
    policy: ConversionPolicy,
) -> Result<ChainResponse<T>, ChainError> {
    let decoded = match &response.body {
        None => Ok(None),
        Some(body) => T::deserialize(body).map(Some),
    };

    match decoded {
        Ok(body) => Ok(ChainResponse::Typed(ApiResponse::new(
            response.status,
            response.headers,
            body,
        ))),
        Err(e) => match policy {
            ConversionPolicy::PassThrough => {
                warn!(
                    target_type = std::any::type_name::<T>(),
                    error = %e,
                    "response does not convert to requested type, returning it as is"
                );
                Ok(ChainResponse::Unconverted(response))
            }
            ConversionPolicy::Strict => Err(ChainError::Conversion {
                status: response.status,
                body: response.body.as_ref().map(Value::to_string).unwrap_or_default(),
                message: e.to_string(),
            }),
        },
    }
}
