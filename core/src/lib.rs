//! Sequential API call chains.
//!
//! # Overview
//! Scripts multi-step API workflows where every call after the first is
//! built from the response of the previous one: "call A, use its result to
//! build B, use B's result to build C". The chain stops at the first failing
//! call and reports which step broke, with its HTTP status and raw body.
//!
//! # Design
//! - `Transport` is the only I/O seam. `UreqTransport` is the bundled
//!   implementation; tests plug in scripted transports.
//! - `Executor` dispatches single calls (`GET`/`POST`) and drives chains.
//!   It holds no per-call state, so one instance serves concurrent chains.
//! - Intermediate responses stay opaque (`RawResponse`); only the last call
//!   is decoded as the caller's type. A chain without builders converts its
//!   only response according to `ConversionPolicy`.
//! - `ProcessorChain` is an optional, caller-driven post-processing hook.
//!
//! ```no_run
//! use seqcall_core::{builder, Executor, HttpRequest, UreqTransport};
//! use serde_json::{json, Value};
//!
//! # async fn run() -> Result<(), seqcall_core::ChainError> {
//! let executor = Executor::new(UreqTransport::default());
//! let order = executor
//!     .execute_sequential_calls::<Value>(
//!         HttpRequest::get("http://localhost:3000/users/1"),
//!         &[builder(|user| {
//!             let order = json!({ "userId": user.field("id") });
//!             HttpRequest::post("http://localhost:3000/orders", order)
//!         })],
//!     )
//!     .await?;
//! println!("order created with status {}", order.status());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod executor;
pub mod http;
pub mod processor;
pub mod sequential;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{ChainConfig, ConversionPolicy, TransportConfig};
pub use convert::{convert_response, ChainResponse};
pub use error::{ApiError, ChainError};
pub use executor::Executor;
pub use http::{ApiResponse, Headers, HttpMethod, HttpRequest, HttpResponse, RawResponse};
pub use processor::{ProcessorChain, ResponseProcessor, ResponseShape};
pub use sequential::{builder, try_builder, NextRequest, NextRequestBuilder};
pub use transport::{Transport, UreqTransport};
