//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

enum Scripted {
    Respond(u16, String),
    Fail(String),
}

/// Replays scripted outcomes in order and records every call it receives.
///
/// `events` is a shared log: the transport appends `"call <url>"` when a call
/// starts and `"done <url>"` once it is answered, and tests can append their
/// own entries (e.g. from builders) to check interleaving.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    response_headers: Vec<(String, String)>,
    delay: Option<Duration>,
    events: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Scripted::Respond(status, body.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Scripted::Fail(message.to_string()))
    }

    pub fn with_response_header(mut self, name: &str, value: &str) -> Self {
        self.response_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, entry: Scripted) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.events)
    }

    async fn answer(&self, call: RecordedCall) -> Result<HttpResponse, ApiError> {
        let url = call.url.clone();
        self.events.lock().unwrap().push(format!("call {url}"));
        self.calls.lock().unwrap().push(call);
        let next = self.script.lock().unwrap().pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events.lock().unwrap().push(format!("done {url}"));

        match next {
            Some(Scripted::Respond(status, body)) => Ok(HttpResponse {
                status,
                headers: self.response_headers.clone(),
                body,
            }),
            Some(Scripted::Fail(message)) => Err(ApiError::transport(message)),
            None => Err(ApiError::transport(format!("no scripted response for {url}"))),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, ApiError> {
        self.answer(RecordedCall {
            method: HttpMethod::Get,
            url: url.to_string(),
            body: None,
            headers: headers.to_vec(),
        })
        .await
    }

    async fn post(
        &self,
        url: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        self.answer(RecordedCall {
            method: HttpMethod::Post,
            url: url.to_string(),
            body,
            headers: headers.to_vec(),
        })
        .await
    }
}
