//! The meta-knowledge-graph table: which (subject category, predicate,
//! object category) triples each provider claims to support.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Provider name → predicates it supports.
pub type PredicateIndex = BTreeMap<String, BTreeSet<String>>;

const BIOLINK_PREFIX: &str = "biolink:";

/// One supported triple of one provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetaKgRow {
    pub provider: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl MetaKgRow {
    /// Build a row, adding the `biolink:` prefix to bare category and
    /// predicate names (the SmartAPI meta-KG omits it).
    pub fn new(provider: &str, subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            provider: provider.to_string(),
            subject: biolink(subject),
            predicate: biolink(predicate),
            object: biolink(object),
        }
    }
}

/// Prefix `term` with `biolink:` unless it already carries a prefix.
pub fn biolink(term: &str) -> String {
    if term.contains(':') {
        term.to_string()
    } else {
        format!("{BIOLINK_PREFIX}{term}")
    }
}

/// Row table across all providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaKg {
    rows: Vec<MetaKgRow>,
}

impl MetaKg {
    pub fn new(rows: Vec<MetaKgRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MetaKgRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = MetaKgRow>) {
        self.rows.extend(rows);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&MetaKgRow) -> bool) {
        self.rows.retain(keep);
    }

    /// Distinct provider names with at least one row.
    pub fn providers(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.provider.as_str()).collect()
    }

    /// Group predicates by provider.
    pub fn predicate_index(&self) -> PredicateIndex {
        let mut index = PredicateIndex::new();
        for row in &self.rows {
            index
                .entry(row.provider.clone())
                .or_default()
                .insert(row.predicate.clone());
        }
        index
    }

    /// Providers with a row whose subject is in `subject_categories`, whose
    /// object is in `object_categories`, and (unless `predicates` is empty)
    /// whose predicate is in `predicates`.
    pub fn select_providers(
        &self,
        subject_categories: &[String],
        object_categories: &[String],
        predicates: &[String],
    ) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter(|r| subject_categories.contains(&r.subject))
            .filter(|r| object_categories.contains(&r.object))
            .filter(|r| predicates.is_empty() || predicates.contains(&r.predicate))
            .map(|r| r.provider.clone())
            .collect()
    }
}
