//! A resolved biomedical concept, as returned by the name resolver or the
//! node normalizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::metakg::biolink;

/// A concept identified by a CURIE, with whatever the answering service knew
/// about it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranslatorNode {
    pub curie: String,
    pub label: Option<String>,
    /// Biolink categories, most specific first.
    pub types: Vec<String>,
    pub synonyms: Vec<String>,
    pub equivalent_identifiers: Vec<EquivalentIdentifier>,
    pub taxa: Vec<String>,
    /// Name-resolver match score.
    pub score: Option<f64>,
    pub information_content: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalentIdentifier {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TranslatorNode {
    pub fn new(curie: &str) -> Self {
        Self {
            curie: curie.to_string(),
            ..Default::default()
        }
    }

    /// Namespace part of the CURIE (`MONDO` for `MONDO:0005148`).
    pub fn curie_prefix(&self) -> &str {
        self.curie.split_once(':').map_or("", |(prefix, _)| prefix)
    }

    /// Build from a name-resolver `lookup`/`bulk-lookup` hit.
    pub(crate) fn from_lookup(hit: NameResHit) -> Self {
        Self {
            curie: hit.curie,
            label: hit.label,
            types: hit.types.iter().map(|t| biolink(t)).collect(),
            synonyms: hit.synonyms,
            taxa: hit.taxa,
            score: hit.score,
            ..Default::default()
        }
    }

    /// Build from a name-resolver `synonyms` entry.
    pub(crate) fn from_synonyms(curie: &str, entry: SynonymsEntry) -> Self {
        Self {
            curie: entry.curie.unwrap_or_else(|| curie.to_string()),
            label: entry.preferred_name,
            types: entry.types.iter().map(|t| biolink(t)).collect(),
            synonyms: entry.names,
            taxa: entry.taxa,
            ..Default::default()
        }
    }

    /// Build from a node-normalizer entry.
    pub(crate) fn from_normalized(entry: NormalizedEntry) -> Self {
        Self {
            curie: entry.id.identifier,
            label: entry.id.label,
            description: entry.id.description,
            types: entry.types,
            equivalent_identifiers: entry.equivalent_identifiers,
            information_content: entry.information_content,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Service payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct NameResHit {
    pub curie: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub taxa: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SynonymsEntry {
    #[serde(default)]
    pub curie: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub taxa: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizedEntry {
    pub id: NormalizedId,
    #[serde(default)]
    pub equivalent_identifiers: Vec<EquivalentIdentifier>,
    #[serde(default, rename = "type")]
    pub types: Vec<String>,
    #[serde(default)]
    pub information_content: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizedId {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `null`, `{}`, or a missing key all mean "no such concept".
pub(crate) fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
