//! Construction and validation of one-hop query graphs.

use crate::error::{QueryError, QueryResult};

use super::QueryGraph;

/// Build a one-hop query: subjects in `subject_ids`, objects of any of
/// `object_categories`, connected by any of `predicates`.
///
/// All three lists must be non-empty and free of blank entries.
///
/// ```
/// use translator_sdk::query::build_query;
///
/// let query = build_query(
///     &["NCBIGene:3845"],
///     &["biolink:Gene"],
///     &["biolink:physically_interacts_with"],
/// )
/// .unwrap();
/// assert_eq!(query.subject_ids(), ["NCBIGene:3845"]);
/// ```
pub fn build_query(
    subject_ids: &[impl AsRef<str>],
    object_categories: &[impl AsRef<str>],
    predicates: &[impl AsRef<str>],
) -> QueryResult<QueryGraph> {
    QueryBuilder::new()
        .subject_ids(subject_ids.iter().map(|s| s.as_ref().to_string()))
        .object_categories(object_categories.iter().map(|s| s.as_ref().to_string()))
        .predicates(predicates.iter().map(|s| s.as_ref().to_string()))
        .build()
}

/// Builder for queries that also constrain object IDs or subject categories.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    subject_ids: Vec<String>,
    subject_categories: Vec<String>,
    object_ids: Vec<String>,
    object_categories: Vec<String>,
    predicates: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subject_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn subject_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subject_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn object_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn object_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn predicates<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates = predicates.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and produce the query graph.
    pub fn build(self) -> QueryResult<QueryGraph> {
        Ok(QueryGraph {
            subject_ids: required("subject_ids", self.subject_ids)?,
            subject_categories: optional("subject_categories", self.subject_categories)?,
            object_categories: required("object_categories", self.object_categories)?,
            object_ids: optional("object_ids", self.object_ids)?,
            predicates: required("predicates", self.predicates)?,
        })
    }
}

fn required(field: &'static str, values: Vec<String>) -> QueryResult<Vec<String>> {
    if values.is_empty() {
        return Err(QueryError::InvalidArgument {
            field,
            reason: "must not be empty".into(),
        });
    }
    reject_blank(field, &values)?;
    Ok(values)
}

fn optional(field: &'static str, values: Vec<String>) -> QueryResult<Option<Vec<String>>> {
    if values.is_empty() {
        return Ok(None);
    }
    reject_blank(field, &values)?;
    Ok(Some(values))
}

fn reject_blank(field: &'static str, values: &[String]) -> QueryResult<()> {
    match values.iter().position(|v| v.trim().is_empty()) {
        Some(i) => Err(QueryError::InvalidArgument {
            field,
            reason: format!("entry {i} is blank"),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_round_trips_inputs() {
        let subjects = ["NCBIGene:3845", "NCBIGene:5290"];
        let categories = ["biolink:Gene", "biolink:Protein"];
        let predicates = [
            "biolink:positively_correlated_with",
            "biolink:physically_interacts_with",
        ];
        let query = build_query(&subjects, &categories, &predicates).unwrap();
        assert_eq!(query.subject_ids(), subjects);
        assert_eq!(query.object_categories(), categories);
        assert_eq!(query.predicates(), predicates);
        assert!(query.object_ids().is_none());
        assert!(query.subject_categories().is_none());
    }

    #[test]
    fn gene_interaction_scenario() {
        let query = build_query(
            &["NCBIGene:3845"],
            &["biolink:Gene"],
            &["biolink:physically_interacts_with"],
        )
        .unwrap();
        let request = query.to_request();
        let graph = &request.message.query_graph;
        assert_eq!(graph.nodes["n00"].ids.as_deref(), Some(&["NCBIGene:3845".to_string()][..]));
        assert_eq!(
            graph.nodes["n01"].categories.as_deref(),
            Some(&["biolink:Gene".to_string()][..])
        );
        assert_eq!(graph.edges["e00"].predicates, ["biolink:physically_interacts_with"]);
    }

    #[test]
    fn empty_lists_are_invalid() {
        let none: [&str; 0] = [];
        let err = build_query(&none, &["biolink:Gene"], &["biolink:affects"]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { field: "subject_ids", .. }));

        let err = build_query(&["A:1"], &none, &["biolink:affects"]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { field: "object_categories", .. }));

        let err = build_query(&["A:1"], &["biolink:Gene"], &none).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { field: "predicates", .. }));
    }

    #[test]
    fn blank_entries_are_invalid() {
        let err = build_query(&["A:1", "  "], &["biolink:Gene"], &["biolink:affects"]).unwrap_err();
        assert!(err.to_string().contains("entry 1 is blank"));
    }

    #[test]
    fn builder_sets_optional_constraints() {
        let query = QueryBuilder::new()
            .subject_ids(["CHEBI:15377"])
            .subject_categories(["biolink:SmallMolecule"])
            .object_ids(["MONDO:0005148"])
            .object_categories(["biolink:Disease"])
            .predicates(["biolink:treats"])
            .build()
            .unwrap();
        assert_eq!(query.subject_categories(), Some(&["biolink:SmallMolecule".to_string()][..]));
        assert_eq!(query.object_ids(), Some(&["MONDO:0005148".to_string()][..]));

        let request = query.to_request();
        let n00 = &request.message.query_graph.nodes["n00"];
        assert_eq!(n00.categories.as_deref(), Some(&["biolink:SmallMolecule".to_string()][..]));
    }
}
