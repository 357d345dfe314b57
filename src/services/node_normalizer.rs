//! Node normalizer (NodeNorm): CURIE → preferred clique identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{ServiceError, ServiceResult};
use crate::http::{Transport, join_url};

use super::node::{NormalizedEntry, TranslatorNode, is_absent};

const SERVICE: &str = "node normalizer";

/// Conflation and payload flags sent with every normalization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Gene/protein conflation.
    pub conflate: bool,
    pub drug_chemical_conflate: bool,
    pub description: bool,
    pub individual_types: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            conflate: true,
            drug_chemical_conflate: false,
            description: false,
            individual_types: false,
        }
    }
}

pub struct NodeNormalizer {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl NodeNormalizer {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
        }
    }

    pub fn status(&self) -> ServiceResult<Value> {
        Ok(self
            .transport
            .get_json(&join_url(&self.base_url, "status"), &[])?)
    }

    /// Normalize every CURIE in one request.
    ///
    /// Every input appears in the result. CURIEs the service cannot
    /// normalize, and blank inputs, map to `None`.
    pub fn normalize(
        &self,
        curies: &[String],
        options: &NormalizeOptions,
    ) -> ServiceResult<BTreeMap<String, Option<TranslatorNode>>> {
        let mut results: BTreeMap<String, Option<TranslatorNode>> =
            curies.iter().map(|c| (c.clone(), None)).collect();
        let to_send: Vec<&String> = curies.iter().filter(|c| !c.trim().is_empty()).collect();
        if to_send.is_empty() {
            return Ok(results);
        }

        let body = json!({
            "curies": to_send,
            "conflate": options.conflate,
            "drug_chemical_conflate": options.drug_chemical_conflate,
            "description": options.description,
            "individual_types": options.individual_types,
        });
        let response = self
            .transport
            .post_json(&join_url(&self.base_url, "get_normalized_nodes"), &body)?;
        let Value::Object(mut by_curie) = response else {
            return Err(ServiceError::UnexpectedShape {
                service: SERVICE,
                message: "get_normalized_nodes response is not an object".into(),
            });
        };

        for curie in to_send {
            let Some(entry) = by_curie.remove(curie.as_str()) else {
                continue;
            };
            if is_absent(&entry) {
                continue;
            }
            let entry: NormalizedEntry =
                serde_json::from_value(entry).map_err(|e| ServiceError::UnexpectedShape {
                    service: SERVICE,
                    message: format!("entry for {curie}: {e}"),
                })?;
            results.insert(curie.clone(), Some(TranslatorNode::from_normalized(entry)));
        }

        let unknown = results.values().filter(|n| n.is_none()).count();
        if unknown > 0 {
            tracing::debug!(unknown, total = results.len(), "CURIEs without a normalization");
        }
        Ok(results)
    }

    /// Normalize a single CURIE. `None` when the service does not know it;
    /// a blank CURIE is `None` without a request.
    pub fn normalize_one(
        &self,
        curie: &str,
        options: &NormalizeOptions,
    ) -> ServiceResult<Option<TranslatorNode>> {
        Ok(self
            .normalize(&[curie.to_string()], options)?
            .remove(curie)
            .flatten())
    }

    /// Preferred label per input CURIE. CURIEs without a normalization or
    /// without a label are left out.
    pub fn preferred_names(
        &self,
        curies: &[String],
        options: &NormalizeOptions,
    ) -> ServiceResult<BTreeMap<String, String>> {
        Ok(self
            .normalize(curies, options)?
            .into_iter()
            .filter_map(|(curie, node)| Some((curie, node?.label?)))
            .collect())
    }

    /// [`preferred_names`](Self::preferred_names) with gene/protein
    /// conflation on and drug/chemical conflation off.
    pub fn preferred_names_gene_protein(
        &self,
        curies: &[String],
    ) -> ServiceResult<BTreeMap<String, String>> {
        self.preferred_names(curies, &NormalizeOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, Reply};

    const URL: &str = "https://nodenorm.example/get_normalized_nodes";

    fn normalizer(transport: FakeTransport) -> (NodeNormalizer, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (
            NodeNormalizer::new(transport.clone(), "https://nodenorm.example/"),
            transport,
        )
    }

    fn response() -> Value {
        json!({
            "MESH:D014867": {
                "id": {"identifier": "CHEBI:15377", "label": "Water"},
                "equivalent_identifiers": [
                    {"identifier": "CHEBI:15377", "label": "water"},
                    {"identifier": "MESH:D014867", "label": "Water"}
                ],
                "type": ["biolink:SmallMolecule", "biolink:ChemicalEntity"],
                "information_content": 47.7
            },
            "NCBIGene:1756": {
                "id": {"identifier": "NCBIGene:1756"},
                "type": ["biolink:Gene"]
            },
            "FAKE:0": null
        })
    }

    #[test]
    fn normalize_sends_flags_and_maps_every_input() {
        let (nn, transport) = normalizer(FakeTransport::new().json(URL, response()));
        let curies = vec![
            "MESH:D014867".to_string(),
            "FAKE:0".to_string(),
            "".to_string(),
        ];
        let options = NormalizeOptions {
            drug_chemical_conflate: true,
            ..Default::default()
        };
        let result = nn.normalize(&curies, &options).unwrap();

        assert_eq!(result.len(), 3);
        let water = result["MESH:D014867"].as_ref().unwrap();
        assert_eq!(water.curie, "CHEBI:15377");
        assert_eq!(water.types[0], "biolink:SmallMolecule");
        assert_eq!(result["FAKE:0"], None);
        assert_eq!(result[""], None);

        let body = transport.calls()[0].body.clone().unwrap();
        assert_eq!(body["curies"], json!(["MESH:D014867", "FAKE:0"]));
        assert_eq!(body["conflate"], true);
        assert_eq!(body["drug_chemical_conflate"], true);
        assert_eq!(body["description"], false);
    }

    #[test]
    fn empty_input_makes_no_call() {
        let (nn, transport) = normalizer(FakeTransport::new());
        let result = nn.normalize(&[], &NormalizeOptions::default()).unwrap();
        assert!(result.is_empty());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn normalize_one_unknown_is_none() {
        let (nn, transport) = normalizer(FakeTransport::new().json(URL, response()));
        let options = NormalizeOptions::default();
        assert_eq!(nn.normalize_one("FAKE:0", &options).unwrap(), None);
        assert_eq!(nn.normalize_one("  ", &options).unwrap(), None);
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn preferred_names_skip_unlabelled() {
        let (nn, _) = normalizer(FakeTransport::new().json(URL, response()));
        let curies = vec![
            "MESH:D014867".to_string(),
            "NCBIGene:1756".to_string(),
            "FAKE:0".to_string(),
        ];
        let names = nn.preferred_names_gene_protein(&curies).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["MESH:D014867"], "Water");
    }

    #[test]
    fn http_failure_propagates() {
        let (nn, _) = normalizer(FakeTransport::new().reply(URL, Reply::Status(502)));
        let err = nn.normalize(&["MESH:D014867".to_string()], &NormalizeOptions::default());
        assert!(matches!(err, Err(ServiceError::Http(_))));
    }
}
