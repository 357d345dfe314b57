//! A single knowledge-provider call.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{HttpError, ProviderError};
use crate::http::Transport;
use crate::query::{QueryGraph, optimize};
use crate::registry::ProviderRegistry;
use crate::trapi::Edge;

/// Classified result of one provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// The provider returned at least one edge.
    Success { edges: BTreeMap<String, Edge> },
    /// The provider answered with a knowledge graph but no edges.
    EmptyResult,
    Failure(ProviderError),
}

impl ProviderOutcome {
    pub fn edge_count(&self) -> usize {
        match self {
            ProviderOutcome::Success { edges } => edges.len(),
            _ => 0,
        }
    }
}

/// Send `query`, narrowed to `provider`'s predicates, to that provider.
///
/// The caller's query is never modified; narrowing happens on a copy. There
/// are no retries.
pub fn execute(
    transport: &dyn Transport,
    provider: &str,
    query: &QueryGraph,
    registry: &ProviderRegistry,
) -> ProviderOutcome {
    let Some(descriptor) = registry.get(provider) else {
        return ProviderOutcome::Failure(ProviderError::UnknownProvider {
            name: provider.to_string(),
        });
    };

    let optimized = optimize(query, &descriptor.predicates);
    if optimized.predicates().len() < query.predicates().len() {
        tracing::debug!(
            provider,
            predicates = ?optimized.predicates(),
            "narrowed query predicates"
        );
    }

    let body = match serde_json::to_value(optimized.to_request()) {
        Ok(body) => body,
        Err(e) => {
            return ProviderOutcome::Failure(ProviderError::Malformed {
                message: format!("cannot encode query: {e}"),
            });
        }
    };

    match transport.post_json(&descriptor.url, &body) {
        Ok(response) => classify_response(response),
        Err(HttpError::Status { code, .. }) => {
            ProviderOutcome::Failure(ProviderError::Status { code })
        }
        Err(HttpError::Transport { message, .. }) => {
            ProviderOutcome::Failure(ProviderError::Network { message })
        }
        Err(HttpError::Decode { message, .. }) => {
            ProviderOutcome::Failure(ProviderError::Malformed { message })
        }
    }
}

/// Classify a decoded TRAPI response body.
///
/// - `message.knowledge_graph.edges` non-empty → `Success`
/// - `message.knowledge_graph` present but without edges → `EmptyResult`
/// - anything else → `Failure(Malformed)`
///
/// Individual edges that cannot be decoded are skipped with a warning; the
/// response is only malformed when none of a non-empty edge map survives.
pub fn classify_response(response: Value) -> ProviderOutcome {
    let Value::Object(mut root) = response else {
        return malformed("response body is not an object");
    };
    let Some(Value::Object(mut message)) = root.remove("message") else {
        return malformed("missing `message` object");
    };
    let Some(kg) = message.remove("knowledge_graph") else {
        return malformed("missing `message.knowledge_graph`");
    };

    let edges = match kg {
        Value::Null => return ProviderOutcome::EmptyResult,
        Value::Object(mut kg) => match kg.remove("edges") {
            None | Some(Value::Null) => return ProviderOutcome::EmptyResult,
            Some(edges) => edges,
        },
        _ => return malformed("`knowledge_graph` is not an object"),
    };

    let Value::Object(raw) = edges else {
        return malformed("`knowledge_graph.edges` is not an object");
    };
    if raw.is_empty() {
        return ProviderOutcome::EmptyResult;
    }

    let total = raw.len();
    let edges: BTreeMap<String, Edge> = raw
        .into_iter()
        .filter_map(|(id, edge)| match serde_json::from_value::<Edge>(edge) {
            Ok(edge) => Some((id, edge)),
            Err(e) => {
                tracing::warn!(edge = %id, "skipping undecodable edge: {e}");
                None
            }
        })
        .collect();

    if edges.is_empty() {
        return malformed(format!("none of {total} edges could be decoded"));
    }
    ProviderOutcome::Success { edges }
}

fn malformed(message: impl Into<String>) -> ProviderOutcome {
    ProviderOutcome::Failure(ProviderError::Malformed {
        message: message.into(),
    })
}
