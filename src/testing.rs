//! In-process [`Transport`] double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::error::{HttpError, HttpResult};
use crate::http::Transport;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Status(u16),
    Network,
    Undecodable,
    Panic(&'static str),
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: &'static str,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Routes by exact URL; unknown URLs fail as transport errors.
#[derive(Default)]
pub(crate) struct FakeTransport {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, url: &str, body: Value) -> Self {
        self.replies.insert(url.to_string(), Reply::Json(body));
        self
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, call: Call) -> HttpResult<Value> {
        let url = call.url.clone();
        self.calls.lock().unwrap().push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&url) {
            std::thread::sleep(*delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&url) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(code)) => Err(HttpError::Status {
                url,
                code: *code,
                body: String::new(),
            }),
            Some(Reply::Undecodable) => Err(HttpError::Decode {
                url,
                message: "expected value at line 1 column 1".into(),
            }),
            Some(Reply::Panic(message)) => panic!("{message}"),
            Some(Reply::Network) | None => Err(HttpError::Transport {
                url,
                message: "connection refused".into(),
            }),
        }
    }
}

impl Transport for FakeTransport {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> HttpResult<Value> {
        self.respond(Call {
            method: "GET",
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
        })
    }

    fn post_json(&self, url: &str, body: &Value) -> HttpResult<Value> {
        self.respond(Call {
            method: "POST",
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}
