// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # translator-sdk
//!
//! A client for the NCATS Biomedical Data Translator: build a one-hop TRAPI
//! query, fan it out to every knowledge provider (KP) that can answer it,
//! and merge what comes back into one knowledge graph.
//!
//! ## Architecture
//!
//! - **Registry** (`registry`): provider URLs from SmartAPI plus predicates from the meta-KG
//! - **Query** (`query`): one-hop query graph builder and per-provider predicate narrowing
//! - **Federation** (`federation`): bounded-concurrency fan-out, failure containment, edge merge
//! - **Services** (`services`): name resolver, node normalizer, node annotator
//! - **Transport** (`http`): the `Transport` seam and its `ureq` implementation
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use translator_sdk::client::TranslatorClient;
//! use translator_sdk::config::SdkConfig;
//! use translator_sdk::query::build_query;
//!
//! let client = TranslatorClient::new(SdkConfig::default());
//! let registry = Arc::new(client.discover_providers().unwrap());
//! let query = build_query(
//!     &["NCBIGene:3845"],
//!     &["biolink:Gene"],
//!     &["biolink:interacts_with"],
//! )
//! .unwrap();
//! let response = client.federated_query(registry, &query, &[]).unwrap();
//! println!("{} edges", response.knowledge_graph.len());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod federation;
pub mod http;
pub mod query;
pub mod registry;
pub mod services;
pub mod trapi;

#[cfg(test)]
mod testing;
