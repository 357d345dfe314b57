//! One-hop TRAPI queries: the typed [`QueryGraph`], its builder, and the
//! per-provider predicate optimizer.
//!
//! A `QueryGraph` is a value: it is cloned, never shared mutably, so the same
//! base query can be narrowed independently for every provider in a
//! federated run.

pub mod builder;
pub mod optimize;

pub use builder::{QueryBuilder, build_query};
pub use optimize::optimize;

use std::collections::BTreeMap;

use crate::error::{QueryError, QueryResult};
use crate::trapi::{
    EDGE_ID, OBJECT_NODE, QEdge, QNode, QueryMessage, QueryRequest, SUBJECT_NODE, WireQueryGraph,
};

/// A subject → predicate → object query template with exactly one edge.
///
/// Invariants (enforced by [`QueryBuilder`] and [`QueryGraph::from_request`]):
/// subject IDs, object categories, and predicates are all non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGraph {
    subject_ids: Vec<String>,
    subject_categories: Option<Vec<String>>,
    object_categories: Vec<String>,
    object_ids: Option<Vec<String>>,
    predicates: Vec<String>,
}

impl QueryGraph {
    pub fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }

    pub fn subject_categories(&self) -> Option<&[String]> {
        self.subject_categories.as_deref()
    }

    pub fn object_categories(&self) -> &[String] {
        &self.object_categories
    }

    pub fn object_ids(&self) -> Option<&[String]> {
        self.object_ids.as_deref()
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Copy of this query with the edge predicates replaced.
    pub(crate) fn with_predicates(&self, predicates: Vec<String>) -> Self {
        debug_assert!(!predicates.is_empty());
        Self {
            predicates,
            ..self.clone()
        }
    }

    /// Render as a TRAPI request body.
    pub fn to_request(&self) -> QueryRequest {
        let mut edges = BTreeMap::new();
        edges.insert(
            EDGE_ID.to_string(),
            QEdge {
                subject: SUBJECT_NODE.to_string(),
                object: OBJECT_NODE.to_string(),
                predicates: self.predicates.clone(),
            },
        );

        let mut nodes = BTreeMap::new();
        nodes.insert(
            SUBJECT_NODE.to_string(),
            QNode {
                ids: Some(self.subject_ids.clone()),
                categories: self.subject_categories.clone(),
            },
        );
        nodes.insert(
            OBJECT_NODE.to_string(),
            QNode {
                ids: self.object_ids.clone(),
                categories: Some(self.object_categories.clone()),
            },
        );

        QueryRequest {
            message: QueryMessage {
                query_graph: WireQueryGraph { edges, nodes },
            },
        }
    }

    /// Render as TRAPI request JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_request())
    }

    /// Parse and validate a TRAPI request body.
    ///
    /// Edge and node keys need not be `e00`/`n00`/`n01`; the graph only has
    /// to be one edge between two declared nodes.
    pub fn from_request(request: &QueryRequest) -> QueryResult<Self> {
        let graph = &request.message.query_graph;
        let mut edges = graph.edges.iter();
        let (Some((edge_id, edge)), None) = (edges.next(), edges.next()) else {
            return Err(QueryError::MalformedQuery {
                message: format!("expected exactly one edge, found {}", graph.edges.len()),
            });
        };

        let node = |key: &str| {
            graph.nodes.get(key).ok_or_else(|| QueryError::MalformedQuery {
                message: format!("edge \"{edge_id}\" references missing node \"{key}\""),
            })
        };
        let subject = node(&edge.subject)?;
        let object = node(&edge.object)?;

        QueryBuilder::new()
            .subject_ids(subject.ids.clone().unwrap_or_default())
            .subject_categories(subject.categories.clone().unwrap_or_default())
            .object_ids(object.ids.clone().unwrap_or_default())
            .object_categories(object.categories.clone().unwrap_or_default())
            .predicates(edge.predicates.clone())
            .build()
    }

    /// Parse a TRAPI request from JSON text.
    pub fn from_json(text: &str) -> QueryResult<Self> {
        let request: QueryRequest =
            serde_json::from_str(text).map_err(|e| QueryError::MalformedQuery {
                message: e.to_string(),
            })?;
        Self::from_request(&request)
    }
}
