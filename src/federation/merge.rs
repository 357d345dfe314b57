//! The merged knowledge graph produced by a federated run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::trapi::Edge;

const PRIMARY_SOURCE: &str = "primary_knowledge_source";
const AGGREGATOR_SOURCE: &str = "aggregator_knowledge_source";

/// Edge ID → edge, unioned across providers (last writer wins on collision).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedKnowledgeGraph {
    edges: BTreeMap<String, Edge>,
}

impl MergedKnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one provider's edges. Returns how many IDs were already present
    /// and got overwritten.
    pub fn merge(&mut self, edges: BTreeMap<String, Edge>) -> usize {
        let mut overwritten = 0;
        for (id, edge) in edges {
            if self.edges.insert(id, edge).is_some() {
                overwritten += 1;
            }
        }
        overwritten
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> &BTreeMap<String, Edge> {
        &self.edges
    }

    pub fn into_edges(self) -> BTreeMap<String, Edge> {
        self.edges
    }

    /// Flatten into one row per edge with its provenance pulled out.
    pub fn edge_rows(&self) -> Vec<EdgeRow> {
        self.edges
            .iter()
            .map(|(id, edge)| EdgeRow {
                edge_id: id.clone(),
                subject: edge.subject.clone(),
                predicate: edge.predicate.clone(),
                object: edge.object.clone(),
                primary_source: edge
                    .sources_with_role(PRIMARY_SOURCE)
                    .first()
                    .map(|s| s.to_string()),
                aggregator_sources: edge
                    .sources_with_role(AGGREGATOR_SOURCE)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }
}

/// A merged edge as a flat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRow {
    pub edge_id: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub primary_source: Option<String>,
    pub aggregator_sources: Vec<String>,
}
