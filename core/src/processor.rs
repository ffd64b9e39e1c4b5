//! Pluggable post-processing of responses by body shape.
//!
//! The executor never calls into this module. Callers register processors
//! in a `ProcessorChain` and run it over whatever responses they want to
//! transform; the first processor that accepts the response's shape wins.

use std::fmt;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::RawResponse;

/// JSON shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    Empty,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ResponseShape {
    pub fn of(response: &RawResponse) -> Self {
        match &response.body {
            None => ResponseShape::Empty,
            Some(Value::Null) => ResponseShape::Null,
            Some(Value::Bool(_)) => ResponseShape::Bool,
            Some(Value::Number(_)) => ResponseShape::Number,
            Some(Value::String(_)) => ResponseShape::String,
            Some(Value::Array(_)) => ResponseShape::Array,
            Some(Value::Object(_)) => ResponseShape::Object,
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseShape::Empty => "empty",
            ResponseShape::Null => "null",
            ResponseShape::Bool => "bool",
            ResponseShape::Number => "number",
            ResponseShape::String => "string",
            ResponseShape::Array => "array",
            ResponseShape::Object => "object",
        };
        f.write_str(name)
    }
}

/// Transforms responses of the shapes it accepts into an `R`.
pub trait ResponseProcessor<R>: Send + Sync {
    fn can_process(&self, shape: ResponseShape) -> bool;

    fn process(&self, response: &RawResponse) -> Result<R, ApiError>;
}

/// Ordered processors with first-match dispatch.
pub struct ProcessorChain<R> {
    processors: Vec<Box<dyn ResponseProcessor<R>>>,
}

impl<R> Default for ProcessorChain<R> {
    fn default() -> Self {
        Self { processors: Vec::new() }
    }
}

impl<R> ProcessorChain<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor. Earlier registrations take precedence.
    pub fn register(mut self, processor: impl ResponseProcessor<R> + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Run the first processor accepting `response`'s shape, or `None` if
    /// no processor does.
    pub fn process(&self, response: &RawResponse) -> Option<Result<R, ApiError>> {
        let shape = ResponseShape::of(response);
        self.processors
            .iter()
            .find(|p| p.can_process(shape))
            .map(|p| p.process(response))
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}
