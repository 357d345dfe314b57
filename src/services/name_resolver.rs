//! Name resolver (NameRes): free text → CURIEs, and CURIE → synonyms.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{ServiceError, ServiceResult};
use crate::http::{Transport, join_url};

use super::node::{NameResHit, SynonymsEntry, TranslatorNode, is_absent};

const SERVICE: &str = "name resolver";

/// Options for [`NameResolver::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOptions {
    pub limit: u32,
    /// Treat the text as an incomplete prefix (type-ahead search).
    pub autocomplete: bool,
    /// Only return concepts of these Biolink types.
    pub biolink_types: Vec<String>,
    /// Only return CURIEs with these prefixes.
    pub only_prefixes: Vec<String>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            autocomplete: false,
            biolink_types: Vec::new(),
            only_prefixes: Vec::new(),
        }
    }
}

pub struct NameResolver {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl NameResolver {
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

    /// Concepts whose names match `text`, best match first.
    ///
    /// Errors with [`ServiceError::NoMatch`] when nothing matches or `text`
    /// is blank.
    pub fn lookup(
        &self,
        text: &str,
        options: &LookupOptions,
    ) -> ServiceResult<Vec<TranslatorNode>> {
        if text.trim().is_empty() {
            return Err(no_match(text));
        }

        let limit = options.limit.to_string();
        let autocomplete = options.autocomplete.to_string();
        let prefixes = options.only_prefixes.join("|");
        let mut query = vec![
            ("string", text),
            ("limit", limit.as_str()),
            ("autocomplete", autocomplete.as_str()),
        ];
        for biolink_type in &options.biolink_types {
            query.push(("biolink_type", biolink_type.as_str()));
        }
        if !prefixes.is_empty() {
            query.push(("only_prefixes", prefixes.as_str()));
        }

        let body = self
            .transport
            .get_json(&join_url(&self.base_url, "lookup"), &query)?;
        let nodes = decode_hits(body)?;
        if nodes.is_empty() {
            return Err(no_match(text));
        }
        Ok(nodes)
    }

    /// The single best match for `text`.
    pub fn lookup_top(&self, text: &str) -> ServiceResult<TranslatorNode> {
        let options = LookupOptions {
            limit: 1,
            ..Default::default()
        };
        self.lookup(text, &options)?
            .into_iter()
            .next()
            .ok_or_else(|| no_match(text))
    }

    /// Look up many strings in one request. Strings with no match map to an
    /// empty list.
    pub fn batch_lookup(
        &self,
        texts: &[String],
        limit: u32,
    ) -> ServiceResult<BTreeMap<String, Vec<TranslatorNode>>> {
        if texts.is_empty() {
            return Ok(BTreeMap::new());
        }
        let body = json!({
            "strings": texts,
            "limit": limit,
            "autocomplete": false,
        });
        let response = self
            .transport
            .post_json(&join_url(&self.base_url, "bulk-lookup"), &body)?;
        let Value::Object(mut by_text) = response else {
            return Err(unexpected("bulk-lookup response is not an object"));
        };

        let mut results = BTreeMap::new();
        for text in texts {
            let nodes = match by_text.remove(text) {
                Some(hits) => decode_hits(hits)?,
                None => Vec::new(),
            };
            results.insert(text.clone(), nodes);
        }
        Ok(results)
    }

    /// Best match per string, `None` where nothing matched.
    pub fn batch_lookup_top(
        &self,
        texts: &[String],
    ) -> ServiceResult<BTreeMap<String, Option<TranslatorNode>>> {
        Ok(self
            .batch_lookup(texts, 1)?
            .into_iter()
            .map(|(text, nodes)| (text, nodes.into_iter().next()))
            .collect())
    }

    /// Preferred name, types and synonyms for each CURIE; `None` for CURIEs
    /// the service does not know.
    pub fn synonyms(
        &self,
        curies: &[String],
    ) -> ServiceResult<BTreeMap<String, Option<TranslatorNode>>> {
        if curies.is_empty() {
            return Ok(BTreeMap::new());
        }
        let body = json!({ "preferred_curies": curies });
        let response = self
            .transport
            .post_json(&join_url(&self.base_url, "synonyms"), &body)?;
        let Value::Object(mut by_curie) = response else {
            return Err(unexpected("synonyms response is not an object"));
        };

        let mut results = BTreeMap::new();
        for curie in curies {
            let node = match by_curie.remove(curie) {
                Some(entry) if !is_absent(&entry) => {
                    let entry: SynonymsEntry = serde_json::from_value(entry)
                        .map_err(|e| unexpected(format!("synonyms entry for {curie}: {e}")))?;
                    Some(TranslatorNode::from_synonyms(curie, entry))
                }
                _ => None,
            };
            results.insert(curie.clone(), node);
        }
        Ok(results)
    }
}

fn decode_hits(value: Value) -> ServiceResult<Vec<TranslatorNode>> {
    let hits: Vec<NameResHit> =
        serde_json::from_value(value).map_err(|e| unexpected(format!("lookup results: {e}")))?;
    Ok(hits.into_iter().map(TranslatorNode::from_lookup).collect())
}

fn no_match(text: &str) -> ServiceError {
    ServiceError::NoMatch {
        service: SERVICE,
        query: format!("\"{text}\""),
    }
}

fn unexpected(message: impl Into<String>) -> ServiceError {
    ServiceError::UnexpectedShape {
        service: SERVICE,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;

    const BASE: &str = "https://name-lookup.example/";

    fn resolver(transport: FakeTransport) -> (NameResolver, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (NameResolver::new(transport.clone(), BASE), transport)
    }

    fn diabetes_hit() -> Value {
        json!({
            "curie": "MONDO:0005148",
            "label": "type 2 diabetes mellitus",
            "synonyms": ["T2DM", "diabetes type 2"],
            "types": ["biolink:Disease", "biolink:DiseaseOrPhenotypicFeature"],
            "taxa": [],
            "score": 152.3
        })
    }

    #[test]
    fn lookup_sends_query_parameters() {
        let (nr, transport) = resolver(
            FakeTransport::new()
                .json("https://name-lookup.example/lookup", json!([diabetes_hit()])),
        );
        let options = LookupOptions {
            limit: 5,
            biolink_types: vec!["biolink:Disease".into()],
            only_prefixes: vec!["MONDO".into(), "DOID".into()],
            ..Default::default()
        };
        let nodes = nr.lookup("diabetes type 2", &options).unwrap();
        assert_eq!(nodes[0].curie, "MONDO:0005148");
        assert_eq!(nodes[0].types[0], "biolink:Disease");
        assert_eq!(nodes[0].score, Some(152.3));

        let call = &transport.calls()[0];
        assert_eq!(call.method, "GET");
        let params: BTreeMap<&str, &str> = call
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(params["string"], "diabetes type 2");
        assert_eq!(params["limit"], "5");
        assert_eq!(params["autocomplete"], "false");
        assert_eq!(params["biolink_type"], "biolink:Disease");
        assert_eq!(params["only_prefixes"], "MONDO|DOID");
    }

    #[test]
    fn lookup_without_results_is_no_match() {
        let (nr, _) = resolver(
            FakeTransport::new().json("https://name-lookup.example/lookup", json!([])),
        );
        let err = nr.lookup("supercalifragilisticexpialidocious", &LookupOptions::default());
        assert!(matches!(err, Err(ServiceError::NoMatch { .. })));
    }

    #[test]
    fn blank_lookup_is_no_match_without_a_call() {
        let (nr, transport) = resolver(FakeTransport::new());
        assert!(matches!(
            nr.lookup_top(""),
            Err(ServiceError::NoMatch { .. })
        ));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn batch_lookup_keeps_every_input() {
        let (nr, transport) = resolver(FakeTransport::new().json(
            "https://name-lookup.example/bulk-lookup",
            json!({"diabetes type 2": [diabetes_hit()], "xyzzy": []}),
        ));
        let texts = vec!["diabetes type 2".to_string(), "xyzzy".to_string()];
        let top = nr.batch_lookup_top(&texts).unwrap();
        assert_eq!(top["diabetes type 2"].as_ref().unwrap().curie, "MONDO:0005148");
        assert!(top["xyzzy"].is_none());

        let body = transport.calls()[0].body.clone().unwrap();
        assert_eq!(body["strings"], json!(["diabetes type 2", "xyzzy"]));
        assert_eq!(body["limit"], 1);
    }

    #[test]
    fn synonyms_map_unknown_curies_to_none() {
        let (nr, _) = resolver(FakeTransport::new().json(
            "https://name-lookup.example/synonyms",
            json!({
                "MONDO:0004979": {
                    "curie": "MONDO:0004979",
                    "preferred_name": "asthma",
                    "names": ["asthma", "bronchial asthma"],
                    "types": ["Disease"]
                },
                "MONDO:0000000": {}
            }),
        ));
        let curies = vec!["MONDO:0004979".to_string(), "MONDO:0000000".to_string()];
        let result = nr.synonyms(&curies).unwrap();
        let asthma = result["MONDO:0004979"].as_ref().unwrap();
        assert_eq!(asthma.label.as_deref(), Some("asthma"));
        assert!(!asthma.synonyms.is_empty());
        assert_eq!(result["MONDO:0000000"], None);
    }
}
