//! Provider discovery against the SmartAPI registry.
//!
//! Three sources feed a [`ProviderRegistry`]:
//!
//! 1. `api/query` on SmartAPI lists every registered Translator API; TRAPI
//!    knowledge providers contribute a name and a `/query` URL.
//! 2. `api/metakg` on SmartAPI is the primary meta-KG table.
//! 3. Configured secondary TRAPI servers (Plover deployments) are not in the
//!    SmartAPI meta-KG; each one's own `/meta_knowledge_graph` is read and
//!    appended.
//!
//! Failure of (1) or (2) fails discovery. A failing secondary source is
//! logged and skipped.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::{RegistryConfig, SecondarySource};
use crate::error::{HttpError, RegistryError, RegistryResult};
use crate::http::{Transport, join_url};
use crate::trapi::MetaKnowledgeGraph;

use super::{MetaKg, MetaKgRow, ProviderRegistry};

const KP_COMPONENT: &str = "KP";

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Value>,
}

#[derive(Deserialize)]
struct SmartApiEntry {
    info: SmartApiInfo,
    #[serde(default)]
    servers: Vec<SmartApiServer>,
}

#[derive(Deserialize)]
struct SmartApiInfo {
    title: String,
    #[serde(rename = "x-translator")]
    translator: Option<TranslatorInfo>,
    #[serde(rename = "x-trapi")]
    trapi: Option<Value>,
}

#[derive(Deserialize)]
struct TranslatorInfo {
    component: Option<String>,
}

#[derive(Deserialize)]
struct SmartApiServer {
    url: String,
    #[serde(rename = "x-maturity")]
    maturity: Option<String>,
}

#[derive(Deserialize)]
struct SmartApiMetaKgHit {
    subject: String,
    predicate: String,
    object: String,
    api: SmartApiRef,
}

#[derive(Deserialize)]
struct SmartApiRef {
    name: String,
}

/// Builds a [`ProviderRegistry`] from live services.
pub struct RegistryDiscovery<'a> {
    transport: &'a dyn Transport,
    smartapi_url: String,
    config: RegistryConfig,
}

impl<'a> RegistryDiscovery<'a> {
    pub fn new(transport: &'a dyn Transport, smartapi_url: &str, config: &RegistryConfig) -> Self {
        Self {
            transport,
            smartapi_url: smartapi_url.to_string(),
            config: config.clone(),
        }
    }

    /// Query the registry and all meta-KG sources.
    pub fn discover(&self) -> RegistryResult<ProviderRegistry> {
        let mut urls = self.fetch_provider_urls()?;
        let mut meta_kg = self.fetch_primary_meta_kg()?;
        tracing::info!(
            providers = urls.len(),
            rows = meta_kg.len(),
            "read SmartAPI registry"
        );

        for source in &self.config.secondary {
            match self.fetch_secondary(source) {
                Ok(rows) => {
                    tracing::debug!(
                        provider = %source.name,
                        rows = rows.len(),
                        "read secondary meta-KG"
                    );
                    urls.entry(source.name.clone())
                        .or_insert_with(|| join_url(&source.url, "query"));
                    meta_kg.extend(rows);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %source.name,
                        "skipping secondary meta-KG source: {e}"
                    );
                }
            }
        }

        let registry = ProviderRegistry::from_parts(urls, meta_kg);
        tracing::info!(
            providers = registry.len(),
            with_predicates = registry.predicate_index().len(),
            "provider discovery complete"
        );
        Ok(registry)
    }

    /// Provider name → `/query` URL for every TRAPI knowledge provider.
    pub fn fetch_provider_urls(&self) -> RegistryResult<BTreeMap<String, String>> {
        let url = join_url(&self.smartapi_url, "api/query");
        let body = self
            .transport
            .get_json(
                &url,
                &[
                    ("q", "tags.name:translator"),
                    ("size", "1000"),
                    ("fields", "info,servers,tags"),
                ],
            )
            .map_err(|source| RegistryError::Discovery {
                stage: "registry lookup",
                source,
            })?;
        let hits = decode_hits(&url, body).map_err(|source| RegistryError::Discovery {
            stage: "registry lookup",
            source,
        })?;

        let mut urls = BTreeMap::new();
        for hit in hits {
            let entry: SmartApiEntry = match serde_json::from_value(hit) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("skipping unreadable SmartAPI entry: {e}");
                    continue;
                }
            };
            let Some((name, query_url)) = self.provider_from_entry(entry) else {
                continue;
            };
            if urls.contains_key(&name) {
                tracing::debug!(provider = %name, "duplicate SmartAPI title, keeping first");
                continue;
            }
            urls.insert(name, query_url);
        }
        Ok(urls)
    }

    /// The primary SmartAPI meta-KG table.
    pub fn fetch_primary_meta_kg(&self) -> RegistryResult<MetaKg> {
        let url = join_url(&self.smartapi_url, "api/metakg");
        let size = self.config.metakg_size.to_string();
        let body = self
            .transport
            .get_json(&url, &[("size", size.as_str())])
            .map_err(|source| RegistryError::Discovery {
                stage: "meta-KG",
                source,
            })?;
        let hits = decode_hits(&url, body).map_err(|source| RegistryError::Discovery {
            stage: "meta-KG",
            source,
        })?;

        let rows = hits
            .into_iter()
            .filter_map(|hit| match serde_json::from_value::<SmartApiMetaKgHit>(hit) {
                Ok(h) => Some(MetaKgRow::new(&h.api.name, &h.subject, &h.predicate, &h.object)),
                Err(e) => {
                    tracing::debug!("skipping unreadable meta-KG row: {e}");
                    None
                }
            })
            .collect();
        Ok(MetaKg::new(rows))
    }

    /// Meta-KG rows from one secondary TRAPI server.
    pub fn fetch_secondary(&self, source: &SecondarySource) -> Result<Vec<MetaKgRow>, HttpError> {
        let url = join_url(&source.url, "meta_knowledge_graph");
        let body = self.transport.get_json(&url, &[])?;
        let meta: MetaKnowledgeGraph =
            serde_json::from_value(body).map_err(|e| HttpError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(meta
            .edges
            .iter()
            .map(|e| MetaKgRow::new(&source.name, &e.subject, &e.predicate, &e.object))
            .collect())
    }

    fn provider_from_entry(&self, entry: SmartApiEntry) -> Option<(String, String)> {
        let info = entry.info;
        info.trapi.as_ref()?;
        let component = info.translator?.component?;
        if component != KP_COMPONENT {
            return None;
        }
        let server = pick_server(&entry.servers, &self.config.maturity)?;
        Some((info.title, join_url(&server.url, "query")))
    }
}

/// First server matching the maturity preference order; servers without a
/// maturity tag are accepted only if nothing matches.
fn pick_server<'s>(
    servers: &'s [SmartApiServer],
    maturity: &[String],
) -> Option<&'s SmartApiServer> {
    maturity
        .iter()
        .find_map(|level| {
            servers
                .iter()
                .find(|s| s.maturity.as_deref() == Some(level.as_str()))
        })
        .or_else(|| servers.iter().find(|s| s.maturity.is_none()))
}

fn decode_hits(url: &str, body: Value) -> Result<Vec<Value>, HttpError> {
    serde_json::from_value::<Hits>(body)
        .map(|h| h.hits)
        .map_err(|e| HttpError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}
