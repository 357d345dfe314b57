//! Node annotator: CURIE → free-form annotation documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::http::{Transport, join_url};

const SERVICE: &str = "node annotator";

/// Extra request fields for the `curie` endpoint. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Return annotations in the upstream source's own structure.
    pub raw: bool,
    /// Restrict the response to these annotation fields.
    pub fields: Vec<String>,
    pub include_extra: Option<bool>,
}

pub struct NodeAnnotator {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl NodeAnnotator {
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

    /// Annotations keyed by CURIE.
    ///
    /// The service sometimes wraps a single annotation document in a
    /// one-element list; those are unwrapped.
    pub fn lookup_curies(
        &self,
        curies: &[String],
        options: &AnnotateOptions,
    ) -> ServiceResult<BTreeMap<String, Value>> {
        let mut body = Map::new();
        body.insert("ids".into(), Value::from(curies.to_vec()));
        if options.raw {
            body.insert("raw".into(), Value::Bool(true));
        }
        if !options.fields.is_empty() {
            body.insert("fields".into(), Value::from(options.fields.join(",")));
        }
        if let Some(include_extra) = options.include_extra {
            body.insert("include_extra".into(), Value::Bool(include_extra));
        }

        let response = self
            .transport
            .post_json(&join_url(&self.base_url, "curie"), &Value::Object(body))?;
        let Value::Object(by_curie) = response else {
            return Err(ServiceError::UnexpectedShape {
                service: SERVICE,
                message: "curie response is not an object".into(),
            });
        };
        if by_curie.is_empty() {
            return Err(ServiceError::NoMatch {
                service: SERVICE,
                query: curies.join(", "),
            });
        }

        Ok(by_curie
            .into_iter()
            .map(|(curie, annotation)| (curie, unwrap_single(annotation)))
            .collect())
    }

    pub fn lookup_curie(&self, curie: &str, options: &AnnotateOptions) -> ServiceResult<Value> {
        self.lookup_curies(&[curie.to_string()], options)?
            .remove(curie)
            .ok_or_else(|| ServiceError::NoMatch {
                service: SERVICE,
                query: curie.to_string(),
            })
    }
}

fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use serde_json::json;

    const URL: &str = "https://annotator.example/curie";

    fn annotator(transport: FakeTransport) -> (NodeAnnotator, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (
            NodeAnnotator::new(transport.clone(), "https://annotator.example/"),
            transport,
        )
    }

    #[test]
    fn single_item_lists_are_unwrapped() {
        let (na, transport) = annotator(FakeTransport::new().json(
            URL,
            json!({
                "NCBIGene:1756": [{"_id": "1756", "symbol": "DMD"}],
                "MESH:D014867": [{"_id": "a"}, {"_id": "b"}]
            }),
        ));
        let curies = vec!["NCBIGene:1756".to_string(), "MESH:D014867".to_string()];
        let result = na.lookup_curies(&curies, &AnnotateOptions::default()).unwrap();
        assert_eq!(result["NCBIGene:1756"]["symbol"], "DMD");
        assert_eq!(result["MESH:D014867"].as_array().unwrap().len(), 2);

        let body = transport.calls()[0].body.clone().unwrap();
        assert_eq!(body, json!({"ids": ["NCBIGene:1756", "MESH:D014867"]}));
    }

    #[test]
    fn options_are_sent_when_set() {
        let (na, transport) = annotator(
            FakeTransport::new().json(URL, json!({"NCIT:C34373": {"name": "x"}})),
        );
        let options = AnnotateOptions {
            raw: true,
            fields: vec!["name".into(), "symbol".into()],
            include_extra: Some(false),
        };
        let annotation = na.lookup_curie("NCIT:C34373", &options).unwrap();
        assert_eq!(annotation["name"], "x");

        let body = transport.calls()[0].body.clone().unwrap();
        assert_eq!(body["raw"], true);
        assert_eq!(body["fields"], "name,symbol");
        assert_eq!(body["include_extra"], false);
    }

    #[test]
    fn empty_response_is_no_match() {
        let (na, _) = annotator(FakeTransport::new().json(URL, json!({})));
        let err = na.lookup_curie("FAKE:0", &AnnotateOptions::default());
        assert!(matches!(err, Err(ServiceError::NoMatch { .. })));
    }

    #[test]
    fn non_object_response_is_unexpected() {
        let (na, _) = annotator(FakeTransport::new().json(URL, json!(["nope"])));
        let err = na.lookup_curie("FAKE:0", &AnnotateOptions::default());
        assert!(matches!(err, Err(ServiceError::UnexpectedShape { .. })));
    }
}
