//! Federated one-hop queries across many knowledge providers.
//!
//! [`execute`] runs one provider call and classifies its response;
//! [`Orchestrator`] fans a query out over a bounded worker pool and merges
//! every successful provider's edges into a [`MergedKnowledgeGraph`].
//!
//! Merge order is completion order. When two providers return the same edge
//! ID the one merged last wins, so which payload survives a collision can
//! differ between runs. This is expected nondeterminism, not a bug.

pub mod executor;
pub mod merge;
pub mod orchestrator;

pub use executor::{ProviderOutcome, classify_response, execute};
pub use merge::{EdgeRow, MergedKnowledgeGraph};
pub use orchestrator::{FederatedResponse, Orchestrator, parallel_query};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::FederationConfig;

/// What a federated run returns when every provider failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllFailedPolicy {
    /// An empty graph, indistinguishable from "no provider had data".
    #[default]
    #[serde(rename = "empty")]
    ReturnEmpty,
    /// [`FederationError::AllProvidersFailed`](crate::error::FederationError::AllProvidersFailed).
    Error,
}

/// Tuning for [`Orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct FederationOptions {
    /// Worker threads, i.e. provider calls in flight at once. Must be ≥ 1.
    pub concurrency: usize,
    /// Ceiling for the whole run. Providers still outstanding when it
    /// elapses are abandoned.
    pub batch_timeout: Option<Duration>,
    pub on_all_failed: AllFailedPolicy,
}

impl Default for FederationOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            batch_timeout: None,
            on_all_failed: AllFailedPolicy::ReturnEmpty,
        }
    }
}

impl From<&FederationConfig> for FederationOptions {
    fn from(config: &FederationConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            batch_timeout: config.batch_timeout_secs.map(Duration::from_secs),
            on_all_failed: config.on_all_failed,
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running
/// federated query.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
