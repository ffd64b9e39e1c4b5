//! Executor and transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when the result of an empty chain does not decode as the
/// requested final type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Hand back the undecoded response as `ChainResponse::Unconverted`.
    #[default]
    PassThrough,
    /// Fail the chain with `ChainError::Conversion`.
    Strict,
}

/// Configuration for an `Executor`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Upper bound for each individual call. `None` waits forever.
    ///
    /// Hitting the limit stops waiting, not the request: `UreqTransport`
    /// leaves the blocking call running in the background, so a timed-out
    /// `POST` may still reach the server after `ApiError::Timeout`.
    #[serde(with = "opt_millis")]
    pub step_timeout: Option<Duration>,
    pub conversion: ConversionPolicy,
}

impl ChainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call timeout.
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    /// Set the conversion policy used for chains without builders.
    pub fn conversion(mut self, policy: ConversionPolicy) -> Self {
        self.conversion = policy;
        self
    }
}

/// Configuration for `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Global timeout for one HTTP exchange, enforced by the HTTP agent.
    #[serde(with = "opt_millis")]
    pub timeout: Option<Duration>,
    /// Headers added to every request before the request's own headers.
    pub default_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            default_headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}

/// Durations are written as whole milliseconds.
mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
