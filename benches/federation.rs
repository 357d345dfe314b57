//! Benchmarks for the CPU-side federation steps.

use std::collections::{BTreeMap, BTreeSet};

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use translator_sdk::federation::{MergedKnowledgeGraph, classify_response};
use translator_sdk::query::{build_query, optimize};
use translator_sdk::trapi::Edge;

fn predicates(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("biolink:predicate_{i}")).collect()
}

fn bench_optimize(c: &mut Criterion) {
    let query = build_query(
        &["NCBIGene:3845"],
        &["biolink:ChemicalEntity"],
        &predicates(50),
    )
    .unwrap();
    let supported: BTreeSet<String> = predicates(200).into_iter().step_by(3).collect();

    c.bench_function("optimize_50_of_200", |bench| {
        bench.iter(|| black_box(optimize(&query, &supported)))
    });
}

fn provider_edges(provider: usize, n: usize) -> BTreeMap<String, Edge> {
    (0..n)
        .map(|i| {
            (
                format!("p{provider}-e{i}"),
                Edge::new("NCBIGene:3845", "biolink:affects", &format!("CHEBI:{i}")),
            )
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let batches: Vec<_> = (0..20).map(|p| provider_edges(p, 500)).collect();

    c.bench_function("merge_20x500", |bench| {
        bench.iter(|| {
            let mut kg = MergedKnowledgeGraph::new();
            for batch in &batches {
                kg.merge(batch.clone());
            }
            black_box(kg.len())
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let edges: serde_json::Map<String, serde_json::Value> = (0..1000)
        .map(|i| {
            (
                format!("e{i}"),
                json!({"subject": "NCBIGene:3845", "predicate": "biolink:affects", "object": format!("CHEBI:{i}")}),
            )
        })
        .collect();
    let response = json!({"message": {"knowledge_graph": {"nodes": {}, "edges": edges}}});

    c.bench_function("classify_1000_edges", |bench| {
        bench.iter(|| black_box(classify_response(response.clone()).edge_count()))
    });
}

criterion_group!(benches, bench_optimize, bench_merge, bench_classify);
criterion_main!(benches);
