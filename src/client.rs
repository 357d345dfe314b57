//! One entry point for every Translator service.
//!
//! `TranslatorClient` owns the configuration and a shared transport, and
//! hands out service wrappers, the provider registry and federated query
//! runners that all use that same transport.

use std::sync::Arc;

use crate::config::SdkConfig;
use crate::error::{RegistryResult, SdkResult};
use crate::federation::{FederatedResponse, FederationOptions, Orchestrator};
use crate::http::{HttpClient, Transport};
use crate::query::QueryGraph;
use crate::registry::{ProviderRegistry, RegistryDiscovery};
use crate::services::{NameResolver, NodeAnnotator, NodeNormalizer};

pub struct TranslatorClient {
    config: SdkConfig,
    transport: Arc<dyn Transport>,
}

impl TranslatorClient {
    /// A client that talks HTTP with the configured timeout and user agent.
    pub fn new(config: SdkConfig) -> Self {
        let transport = Arc::new(HttpClient::new(&config.http));
        Self { config, transport }
    }

    /// A client over any transport, e.g. a recording fake in tests.
    pub fn with_transport(config: SdkConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn name_resolver(&self) -> NameResolver {
        NameResolver::new(self.transport(), &self.config.services.name_resolver_url)
    }

    pub fn node_normalizer(&self) -> NodeNormalizer {
        NodeNormalizer::new(self.transport(), &self.config.services.node_normalizer_url)
    }

    pub fn node_annotator(&self) -> NodeAnnotator {
        NodeAnnotator::new(self.transport(), &self.config.services.node_annotator_url)
    }

    /// Build a fresh provider registry from SmartAPI and the meta-KG sources.
    pub fn discover_providers(&self) -> RegistryResult<ProviderRegistry> {
        RegistryDiscovery::new(
            self.transport.as_ref(),
            &self.config.services.smartapi_url,
            &self.config.registry,
        )
        .discover()
    }

    /// An orchestrator over `registry` using the configured federation
    /// settings.
    pub fn orchestrator(&self, registry: Arc<ProviderRegistry>) -> Orchestrator {
        Orchestrator::new(
            self.transport(),
            registry,
            FederationOptions::from(&self.config.federation),
        )
    }

    /// Run `query` against `providers`, or against every registered provider
    /// when `providers` is empty.
    pub fn federated_query(
        &self,
        registry: Arc<ProviderRegistry>,
        query: &QueryGraph,
        providers: &[String],
    ) -> SdkResult<FederatedResponse> {
        let selected = if providers.is_empty() {
            registry.names()
        } else {
            providers.to_vec()
        };
        Ok(self.orchestrator(registry).run(query, &selected)?)
    }
}

impl Default for TranslatorClient {
    fn default() -> Self {
        Self::new(SdkConfig::default())
    }
}
