//! Rich diagnostic error types for the translator SDK.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know which service failed
//! and what to check. [`SdkError`] wraps them all for callers that do not care
//! which layer an error came from.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the translator SDK.
#[derive(Debug, Error, Diagnostic)]
pub enum SdkError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Federation(#[from] FederationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type SdkResult<T> = std::result::Result<T, SdkError>;

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("invalid {field}: {reason}")]
    #[diagnostic(
        code(tsdk::query::invalid_argument),
        help(
            "A one-hop query needs at least one subject ID, one object category \
             and one predicate, and none of them may be blank."
        )
    )]
    InvalidArgument { field: &'static str, reason: String },

    #[error("malformed query graph: {message}")]
    #[diagnostic(
        code(tsdk::query::malformed),
        help(
            "Only one-hop TRAPI queries are supported: a single edge `e00` from \
             subject node `n00` to object node `n01`."
        )
    )]
    MalformedQuery { message: String },
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("provider discovery failed at {stage}")]
    #[diagnostic(
        code(tsdk::registry::discovery),
        help(
            "The SmartAPI registry or its meta-knowledge-graph endpoint could not be \
             read. Check network access and the `smartapi_url` setting, then re-run \
             discovery."
        )
    )]
    Discovery {
        stage: &'static str,
        #[source]
        source: HttpError,
    },
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

// ---------------------------------------------------------------------------
// Per-provider call errors
// ---------------------------------------------------------------------------

/// Why a single knowledge-provider call produced no usable edges.
///
/// These never abort a federated run; the orchestrator records them next to
/// the provider name and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ProviderError {
    #[error("unknown provider \"{name}\"")]
    #[diagnostic(
        code(tsdk::provider::unknown),
        help(
            "The provider is not in the registry. List known providers with \
             `translator providers`."
        )
    )]
    UnknownProvider { name: String },

    #[error("provider returned HTTP {code}")]
    #[diagnostic(code(tsdk::provider::status))]
    Status { code: u16 },

    #[error("provider call failed: {message}")]
    #[diagnostic(
        code(tsdk::provider::network),
        help("The provider may be down or slow; raise `http.timeout_secs` if it is slow.")
    )]
    Network { message: String },

    #[error("malformed provider response: {message}")]
    #[diagnostic(code(tsdk::provider::malformed))]
    Malformed { message: String },

    #[error("provider call panicked: {message}")]
    #[diagnostic(code(tsdk::provider::panicked))]
    Panicked { message: String },
}

// ---------------------------------------------------------------------------
// Federation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FederationError {
    #[error("concurrency must be at least 1, got {value}")]
    #[diagnostic(code(tsdk::federation::concurrency))]
    InvalidConcurrency { value: usize },

    #[error("all {attempted} providers failed")]
    #[diagnostic(
        code(tsdk::federation::all_failed),
        help(
            "Every selected provider returned an error. Set \
             `federation.on_all_failed = \"empty\"` to receive an empty graph instead."
        )
    )]
    AllProvidersFailed {
        attempted: usize,
        failures: Vec<(String, ProviderError)>,
    },

    #[error("failed to start worker pool: {message}")]
    #[diagnostic(code(tsdk::federation::worker_pool))]
    WorkerPool { message: String },
}

pub type FederationResult<T> = std::result::Result<T, FederationError>;

// ---------------------------------------------------------------------------
// HTTP errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum HttpError {
    #[error("{url} returned HTTP {code}")]
    #[diagnostic(code(tsdk::http::status))]
    Status { url: String, code: u16, body: String },

    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(tsdk::http::transport),
        help("Check network connectivity and that the service URL is correct.")
    )]
    Transport { url: String, message: String },

    #[error("failed to decode JSON from {url}: {message}")]
    #[diagnostic(
        code(tsdk::http::decode),
        help("The service returned a body that is not valid JSON.")
    )]
    Decode { url: String, message: String },
}

pub type HttpResult<T> = std::result::Result<T, HttpError>;

// ---------------------------------------------------------------------------
// Collaborator service errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Http(#[from] HttpError),

    #[error("{service}: no match for {query}")]
    #[diagnostic(
        code(tsdk::service::no_match),
        help("Try a different spelling, a broader search, or check that the CURIE exists.")
    )]
    NoMatch { service: &'static str, query: String },

    #[error("{service}: unexpected response shape: {message}")]
    #[diagnostic(
        code(tsdk::service::unexpected_shape),
        help("The service API may have changed. Check the service's OpenAPI documentation.")
    )]
    UnexpectedShape {
        service: &'static str,
        message: String,
    },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(tsdk::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(tsdk::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {path}: {message}")]
    #[diagnostic(code(tsdk::config::serialize))]
    Serialize { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(tsdk::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine home directory")]
    #[diagnostic(
        code(tsdk::config::no_home),
        help("Set HOME or XDG_CONFIG_HOME, or pass --config explicitly.")
    )]
    NoHome,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
