//! Provider registry: the knowledge providers a federated query can reach.
//!
//! A [`ProviderRegistry`] pairs each provider's query URL with the predicates
//! its meta-KG advertises. It is built once by [`RegistryDiscovery`] (or from
//! cached parts with [`ProviderRegistry::from_parts`]) and is read-only for
//! the rest of a session; re-run discovery to refresh it.

pub mod discovery;
pub mod metakg;

pub use discovery::RegistryDiscovery;
pub use metakg::{MetaKg, MetaKgRow, PredicateIndex};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// A queryable knowledge provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub name: String,
    /// TRAPI `/query` endpoint.
    pub url: String,
    /// Predicates from the provider's meta-KG; empty when it advertised none.
    pub predicates: BTreeSet<String>,
}

/// Provider descriptors keyed by name, plus the meta-KG they were built from.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderDescriptor>,
    meta_kg: MetaKg,
}

impl ProviderRegistry {
    /// Build a registry from provider URLs and a meta-KG table.
    ///
    /// Meta-KG rows for providers without a URL are dropped, so every
    /// provider in [`predicate_index`](Self::predicate_index) is also a
    /// descriptor.
    pub fn from_parts(urls: BTreeMap<String, String>, mut meta_kg: MetaKg) -> Self {
        let before = meta_kg.len();
        meta_kg.retain(|row| urls.contains_key(&row.provider));
        if meta_kg.len() < before {
            tracing::debug!(
                dropped = before - meta_kg.len(),
                "meta-KG rows without a provider URL"
            );
        }

        let mut index = meta_kg.predicate_index();
        let providers = urls
            .into_iter()
            .map(|(name, url)| {
                let predicates = index.remove(&name).unwrap_or_default();
                let descriptor = ProviderDescriptor {
                    name: name.clone(),
                    url,
                    predicates,
                };
                (name, descriptor)
            })
            .collect();

        Self { providers, meta_kg }
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.values()
    }

    /// Provider name → query URL.
    pub fn urls(&self) -> BTreeMap<String, String> {
        self.providers
            .values()
            .map(|d| (d.name.clone(), d.url.clone()))
            .collect()
    }

    /// Provider name → supported predicates, for providers with meta-KG rows.
    pub fn predicate_index(&self) -> PredicateIndex {
        self.providers
            .values()
            .filter(|d| !d.predicates.is_empty())
            .map(|d| (d.name.clone(), d.predicates.clone()))
            .collect()
    }

    pub fn meta_kg(&self) -> &MetaKg {
        &self.meta_kg
    }

    /// Registered providers whose meta-KG covers the given categories (and
    /// any of `predicates`, when non-empty). See [`MetaKg::select_providers`].
    pub fn select_providers(
        &self,
        subject_categories: &[String],
        object_categories: &[String],
        predicates: &[String],
    ) -> Vec<String> {
        self.meta_kg
            .select_providers(subject_categories, object_categories, predicates)
            .into_iter()
            .collect()
    }
}
