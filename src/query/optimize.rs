//! Per-provider predicate narrowing.

use std::collections::BTreeSet;

use super::QueryGraph;

/// Narrow `query`'s predicates to those the provider advertises.
///
/// Returns a new graph whose predicates are the intersection (in the query's
/// original order). When the intersection is empty the query is returned
/// unchanged.
pub fn optimize(query: &QueryGraph, provider_predicates: &BTreeSet<String>) -> QueryGraph {
    let shared: Vec<String> = query
        .predicates()
        .iter()
        .filter(|p| provider_predicates.contains(p.as_str()))
        .cloned()
        .collect();

    if shared.is_empty() {
        query.clone()
    } else {
        query.with_predicates(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::build_query;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn affects_or_treats() -> QueryGraph {
        build_query(
            &["MONDO:0005148"],
            &["biolink:ChemicalEntity"],
            &["biolink:affects", "biolink:treats"],
        )
        .unwrap()
    }

    #[test]
    fn narrows_to_supported_predicates() {
        let query = affects_or_treats();
        let narrowed = optimize(&query, &set(&["biolink:affects"]));
        assert_eq!(narrowed.predicates(), ["biolink:affects"]);
        assert_eq!(narrowed.subject_ids(), query.subject_ids());
        assert_eq!(narrowed.object_categories(), query.object_categories());
    }

    #[test]
    fn empty_intersection_keeps_original_predicates() {
        let query = affects_or_treats();
        let unchanged = optimize(&query, &set(&["biolink:unrelated"]));
        assert_eq!(unchanged.predicates(), ["biolink:affects", "biolink:treats"]);
        assert_eq!(unchanged, query);
    }

    #[test]
    fn empty_provider_set_is_a_no_op() {
        let query = affects_or_treats();
        assert_eq!(optimize(&query, &BTreeSet::new()), query);
    }

    #[test]
    fn never_mutates_input() {
        let query = affects_or_treats();
        let before = query.clone();
        let first = optimize(&query, &set(&["biolink:treats"]));
        let second = optimize(&query, &set(&["biolink:affects"]));
        assert_eq!(query, before);
        assert_eq!(first.predicates(), ["biolink:treats"]);
        assert_eq!(second.predicates(), ["biolink:affects"]);
    }

    #[test]
    fn result_is_subset_of_query_predicates() {
        let query = affects_or_treats();
        let provider = set(&["biolink:treats", "biolink:causes", "biolink:affects"]);
        let narrowed = optimize(&query, &provider);
        for p in narrowed.predicates() {
            assert!(query.predicates().contains(p));
        }
        assert_eq!(narrowed.predicates(), ["biolink:affects", "biolink:treats"]);
    }
}
