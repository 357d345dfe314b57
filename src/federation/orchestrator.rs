//! Fan-out / fan-in of one query across many providers.
//!
//! Every selected provider becomes one job on a `rayon` pool sized to the
//! requested concurrency. Jobs own their own copy of the query and report
//! back over a channel; the calling thread is the only collector and the only
//! writer of the merged graph. When the run is cancelled or its deadline
//! passes, queued jobs skip their call and anything that arrives afterwards is
//! dropped with the channel.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::error::{FederationError, FederationResult, ProviderError};
use crate::http::Transport;
use crate::query::QueryGraph;
use crate::registry::ProviderRegistry;

use super::executor::{ProviderOutcome, execute};
use super::merge::MergedKnowledgeGraph;
use super::{AllFailedPolicy, CancelToken, FederationOptions};

/// How often the collector wakes up to check for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Merged graph plus a per-provider account of the run.
#[derive(Debug, Clone, Default)]
pub struct FederatedResponse {
    pub knowledge_graph: MergedKnowledgeGraph,
    /// Providers whose edges were merged, in completion order.
    pub succeeded: Vec<String>,
    /// Providers that answered with no edges.
    pub empty: Vec<String>,
    pub failed: Vec<(String, ProviderError)>,
    /// Providers abandoned by cancellation or the batch deadline.
    pub cancelled: Vec<String>,
    pub elapsed: Duration,
}

impl FederatedResponse {
    pub fn into_knowledge_graph(self) -> MergedKnowledgeGraph {
        self.knowledge_graph
    }

    /// Whether the run stopped before every provider reported.
    pub fn was_interrupted(&self) -> bool {
        !self.cancelled.is_empty()
    }

    fn record(&mut self, provider: String, outcome: ProviderOutcome) {
        match outcome {
            ProviderOutcome::Success { edges } => {
                let count = edges.len();
                let overwritten = self.knowledge_graph.merge(edges);
                if overwritten > 0 {
                    tracing::debug!(
                        provider = %provider,
                        overwritten,
                        "edge IDs already merged from another provider were replaced"
                    );
                }
                tracing::info!(provider = %provider, edges = count, "provider succeeded");
                self.succeeded.push(provider);
            }
            ProviderOutcome::EmptyResult => {
                tracing::debug!(provider = %provider, "provider returned no edges");
                self.empty.push(provider);
            }
            ProviderOutcome::Failure(error) => {
                tracing::warn!(provider = %provider, "provider failed: {error}");
                self.failed.push((provider, error));
            }
        }
    }
}

/// Runs federated queries against a fixed registry.
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    registry: Arc<ProviderRegistry>,
    options: FederationOptions,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<ProviderRegistry>,
        options: FederationOptions,
    ) -> Self {
        Self {
            transport,
            registry,
            options,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn options(&self) -> &FederationOptions {
        &self.options
    }

    /// Query every provider in `selected` and merge the results.
    pub fn run(
        &self,
        query: &QueryGraph,
        selected: &[String],
    ) -> FederationResult<FederatedResponse> {
        self.run_with_cancel(query, selected, &CancelToken::new())
    }

    /// Like [`run`](Self::run), returning early once `cancel` is set.
    ///
    /// Duplicate names in `selected` are queried once.
    pub fn run_with_cancel(
        &self,
        query: &QueryGraph,
        selected: &[String],
        cancel: &CancelToken,
    ) -> FederationResult<FederatedResponse> {
        if self.options.concurrency == 0 {
            return Err(FederationError::InvalidConcurrency { value: 0 });
        }

        let started = Instant::now();
        let deadline = self.options.batch_timeout.map(|t| started + t);

        let mut seen = BTreeSet::new();
        let providers: Vec<&String> = selected.iter().filter(|p| seen.insert(*p)).collect();

        let mut response = FederatedResponse::default();
        if providers.is_empty() {
            return Ok(response);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency.min(providers.len()))
            .thread_name(|i| format!("kp-worker-{i}"))
            .build()
            .map_err(|e| FederationError::WorkerPool {
                message: e.to_string(),
            })?;

        tracing::info!(
            providers = providers.len(),
            concurrency = self.options.concurrency,
            "dispatching federated query"
        );

        // Set when this run stops collecting, so queued jobs skip their call.
        let stop = CancelToken::new();
        let (tx, rx) = mpsc::channel::<(String, ProviderOutcome)>();
        let mut pending: BTreeSet<String> = BTreeSet::new();

        for provider in providers {
            pending.insert(provider.clone());

            let tx = tx.clone();
            let transport = Arc::clone(&self.transport);
            let registry = Arc::clone(&self.registry);
            let query = query.clone();
            let cancel = cancel.clone();
            let stop = stop.clone();
            let provider = provider.clone();
            pool.spawn(move || {
                if cancel.is_cancelled() || stop.is_cancelled() {
                    return;
                }
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    execute(transport.as_ref(), &provider, &query, &registry)
                }))
                .unwrap_or_else(|payload| {
                    ProviderOutcome::Failure(ProviderError::Panicked {
                        message: panic_message(payload.as_ref()),
                    })
                });
                // The receiver is gone if the run already returned.
                let _ = tx.send((provider, outcome));
            });
        }
        drop(tx);

        while !pending.is_empty() {
            if cancel.is_cancelled() {
                tracing::warn!(outstanding = pending.len(), "federated query cancelled");
                break;
            }
            let wait = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        tracing::warn!(
                            outstanding = pending.len(),
                            "federated query hit its batch timeout"
                        );
                        break;
                    }
                    left.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };

            match rx.recv_timeout(wait) {
                Ok((provider, outcome)) => {
                    if cancel.is_cancelled() {
                        // Arrived after cancellation: never merged.
                        break;
                    }
                    pending.remove(&provider);
                    response.record(provider, outcome);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if !pending.is_empty() {
            stop.cancel();
            response.cancelled = pending.into_iter().collect();
        }
        response.elapsed = started.elapsed();

        tracing::info!(
            edges = response.knowledge_graph.len(),
            succeeded = response.succeeded.len(),
            empty = response.empty.len(),
            failed = response.failed.len(),
            cancelled = response.cancelled.len(),
            elapsed_ms = response.elapsed.as_millis() as u64,
            "federated query finished"
        );

        let all_failed = response.succeeded.is_empty()
            && response.empty.is_empty()
            && response.cancelled.is_empty();
        if all_failed && self.options.on_all_failed == AllFailedPolicy::Error {
            return Err(FederationError::AllProvidersFailed {
                attempted: response.failed.len(),
                failures: response.failed,
            });
        }

        Ok(response)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Query `selected` providers with up to `concurrency` calls in flight and
/// return only the merged edges.
pub fn parallel_query(
    transport: Arc<dyn Transport>,
    query: &QueryGraph,
    selected: &[String],
    registry: Arc<ProviderRegistry>,
    concurrency: usize,
) -> FederationResult<MergedKnowledgeGraph> {
    let options = FederationOptions {
        concurrency,
        ..Default::default()
    };
    Orchestrator::new(transport, registry, options)
        .run(query, selected)
        .map(FederatedResponse::into_knowledge_graph)
}
