//! TRAPI wire types: the documents exchanged with knowledge providers.
//!
//! Only the parts of the schema the SDK reads or writes are typed. Unknown
//! fields on edges are carried through untouched in `extra` so a merged graph
//! loses nothing a provider sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Edge key of the single query edge.
pub const EDGE_ID: &str = "e00";
/// Node key of the query subject.
pub const SUBJECT_NODE: &str = "n00";
/// Node key of the query object.
pub const OBJECT_NODE: &str = "n01";

// ---------------------------------------------------------------------------
// Query documents
// ---------------------------------------------------------------------------

/// Top-level request body: `{"message": {"query_graph": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub message: QueryMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMessage {
    pub query_graph: WireQueryGraph,
}

/// A query graph exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireQueryGraph {
    #[serde(default)]
    pub edges: BTreeMap<String, QEdge>,
    #[serde(default)]
    pub nodes: BTreeMap<String, QNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEdge {
    pub subject: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Knowledge graph edges
// ---------------------------------------------------------------------------

/// A knowledge-graph edge returned by a provider.
///
/// Providers do not always fill every field; missing ones decode as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub predicate: String,
    #[serde(default)]
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RetrievalSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Value>>,
    /// Fields this SDK does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    /// Shorthand for an edge with no provenance, mostly useful in tests.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            sources: None,
            attributes: None,
            extra: Map::new(),
        }
    }

    /// Resource IDs of all sources with the given role.
    pub fn sources_with_role(&self, role: &str) -> Vec<&str> {
        self.sources
            .iter()
            .flatten()
            .filter(|s| s.resource_role == role)
            .map(|s| s.resource_id.as_str())
            .collect()
    }
}

/// Provenance entry on an edge (`primary_knowledge_source`,
/// `aggregator_knowledge_source`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSource {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub resource_role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Meta knowledge graph
// ---------------------------------------------------------------------------

/// The `/meta_knowledge_graph` document served by TRAPI providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaKnowledgeGraph {
    #[serde(default)]
    pub edges: Vec<MetaEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_keeps_unknown_fields() {
        let raw = json!({
            "subject": "NCBIGene:3845",
            "predicate": "biolink:physically_interacts_with",
            "object": "NCBIGene:5290",
            "sources": [
                {"resource_id": "infores:string", "resource_role": "primary_knowledge_source"},
                {"resource_id": "infores:automat", "resource_role": "aggregator_knowledge_source"}
            ],
            "qualifiers": [{"qualifier_type_id": "biolink:object_aspect_qualifier"}]
        });
        let edge: Edge = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(edge.sources_with_role("primary_knowledge_source"), vec!["infores:string"]);
        assert!(edge.extra.contains_key("qualifiers"));
        assert_eq!(serde_json::to_value(&edge).unwrap(), raw);
    }

    #[test]
    fn edge_without_predicate_is_rejected() {
        let raw = json!({"subject": "A:1", "object": "B:2"});
        assert!(serde_json::from_value::<Edge>(raw).is_err());
    }

    #[test]
    fn qnode_omits_absent_constraints() {
        let node = QNode {
            ids: Some(vec!["MONDO:0005148".into()]),
            categories: None,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"ids": ["MONDO:0005148"]})
        );
    }
}
