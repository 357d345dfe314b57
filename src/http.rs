//! HTTP transport shared by every service wrapper.
//!
//! All network access goes through the [`Transport`] trait so that the
//! registry, the federated executor, and the collaborator services can be
//! driven by an in-process fake in tests. [`HttpClient`] is the production
//! implementation: a `ureq::Agent` configured once with the timeout and user
//! agent from [`HttpConfig`](crate::config::HttpConfig) and reused (with its
//! connection pool) for every call.

use std::time::Duration;

use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::{HttpError, HttpResult};

/// Maximum number of characters of an error body kept in [`HttpError::Status`].
const ERROR_BODY_PREVIEW: usize = 500;

/// Blocking JSON-over-HTTP transport.
pub trait Transport: Send + Sync {
    /// `GET url?k=v&...` and decode the JSON body.
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> HttpResult<Value>;

    /// `POST url` with a JSON body and decode the JSON response.
    fn post_json(&self, url: &str, body: &Value) -> HttpResult<Value>;
}

/// `ureq`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .build();
        Self { agent, timeout }
    }

    /// Per-request timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

impl Transport for HttpClient {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> HttpResult<Value> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        tracing::debug!(url, "GET");
        decode(url, request.call())
    }

    fn post_json(&self, url: &str, body: &Value) -> HttpResult<Value> {
        tracing::debug!(url, "POST");
        decode(url, self.agent.post(url).send_json(body))
    }
}

fn decode(url: &str, result: Result<ureq::Response, ureq::Error>) -> HttpResult<Value> {
    match result {
        Ok(response) => response.into_json::<Value>().map_err(|e| HttpError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(HttpError::Status {
                url: url.to_string(),
                code,
                body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            })
        }
        Err(ureq::Error::Transport(transport)) => Err(HttpError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        }),
    }
}

/// Join a service base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
