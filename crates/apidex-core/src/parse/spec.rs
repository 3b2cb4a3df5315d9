use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use super::openapi3::OpenApi3Spec;
use super::swagger2::Swagger2Spec;
use crate::error::ParseError;

/// Document-level metadata, shared by both dialects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The two supported API description dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Swagger2,
    OpenApi3,
}

impl Dialect {
    /// Detect the dialect from the version marker of a raw document.
    ///
    /// Swagger 2.0 requires `swagger: "2.0"` exactly; OpenAPI 3.0 accepts any
    /// `openapi` string starting with `3`.
    pub fn detect(doc: &Value) -> Result<Self, ParseError> {
        if doc.get("swagger").and_then(Value::as_str) == Some("2.0") {
            return Ok(Dialect::Swagger2);
        }
        if let Some(version) = doc.get("openapi").and_then(Value::as_str) {
            if version.starts_with('3') {
                return Ok(Dialect::OpenApi3);
            }
            return Err(ParseError::UnsupportedDocumentFormat(format!(
                "openapi {version}"
            )));
        }
        match doc.get("swagger") {
            Some(version) => Err(ParseError::UnsupportedDocumentFormat(format!(
                "swagger {version}"
            ))),
            None => Err(ParseError::UnsupportedDocumentFormat(
                "no swagger or openapi version marker".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Swagger2 => "Swagger 2.0",
            Dialect::OpenApi3 => "OpenAPI 3.0",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path item: HTTP method (or the reserved `parameters` key) to raw
/// operation object. Operations are typed on demand by the dialect adapters.
pub type PathItem = Map<String, Value>;

/// Key used for parameters shared by every operation of a path.
pub const PATH_PARAMETERS_KEY: &str = "parameters";

/// A parsed API description in one of the two supported dialects.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Swagger2(Swagger2Spec),
    OpenApi3(OpenApi3Spec),
}

impl Document {
    /// Detect the dialect of `doc` and deserialize it into the matching
    /// variant.
    pub fn from_value(doc: &Value) -> Result<Self, ParseError> {
        match Dialect::detect(doc)? {
            Dialect::Swagger2 => Ok(Document::Swagger2(serde_json::from_value(doc.clone())?)),
            Dialect::OpenApi3 => Ok(Document::OpenApi3(serde_json::from_value(doc.clone())?)),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Document::Swagger2(_) => Dialect::Swagger2,
            Document::OpenApi3(_) => Dialect::OpenApi3,
        }
    }

    /// The declared version marker (`2.0`, `3.0.3`, ...).
    pub fn version(&self) -> &str {
        match self {
            Document::Swagger2(spec) => &spec.swagger,
            Document::OpenApi3(spec) => &spec.openapi,
        }
    }

    pub fn info(&self) -> Option<&Info> {
        match self {
            Document::Swagger2(spec) => spec.info.as_ref(),
            Document::OpenApi3(spec) => spec.info.as_ref(),
        }
    }

    pub fn paths(&self) -> &IndexMap<String, Value> {
        match self {
            Document::Swagger2(spec) => &spec.paths,
            Document::OpenApi3(spec) => &spec.paths,
        }
    }

    /// The raw path item for `path`, if the document declares it.
    pub fn path_item(&self, path: &str) -> Option<&PathItem> {
        self.paths().get(path).and_then(Value::as_object)
    }

    /// Names of the reusable schemas (`definitions` or `components.schemas`).
    pub fn schema_names(&self) -> Vec<&str> {
        let registry = match self {
            Document::Swagger2(spec) => &spec.definitions,
            Document::OpenApi3(spec) => match spec.components {
                Some(ref components) => &components.schemas,
                None => return Vec::new(),
            },
        };
        registry.keys().map(String::as_str).collect()
    }

    /// Every `(path, method, operation)` triple in declaration order.
    ///
    /// Skips the path-level `parameters` key and any entry whose value is not
    /// an object, since neither can describe an operation.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.paths().iter().flat_map(|(path, item)| {
            item.as_object()
                .into_iter()
                .flat_map(move |methods| {
                    methods.iter().filter_map(move |(method, operation)| {
                        if method == PATH_PARAMETERS_KEY || !operation.is_object() {
                            None
                        } else {
                            Some((path.as_str(), method.as_str(), operation))
                        }
                    })
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detect_swagger2() {
        let doc = json!({"swagger": "2.0", "paths": {}});
        assert_eq!(Dialect::detect(&doc).unwrap(), Dialect::Swagger2);
    }

    #[test]
    fn detect_openapi3() {
        let doc = json!({"openapi": "3.0.3", "paths": {}});
        assert_eq!(Dialect::detect(&doc).unwrap(), Dialect::OpenApi3);
    }

    #[test]
    fn reject_other_versions() {
        assert!(Dialect::detect(&json!({"swagger": "1.2"})).is_err());
        assert!(Dialect::detect(&json!({"openapi": "2.0.0"})).is_err());
        assert!(Dialect::detect(&json!({"info": {}})).is_err());
    }

    #[test]
    fn operations_skip_shared_parameters() {
        let doc = json!({
            "swagger": "2.0",
            "paths": {
                "/pets": {
                    "parameters": [{"name": "trace", "in": "header", "type": "string"}],
                    "get": {"summary": "List pets"},
                    "post": {"summary": "Create pet"}
                },
                "/stores": {
                    "summary": "Stores",
                    "get": {}
                }
            }
        });
        let document = Document::from_value(&doc).unwrap();
        let ops: Vec<(&str, &str)> = document
            .operations()
            .map(|(path, method, _)| (path, method))
            .collect();
        assert_eq!(
            ops,
            vec![("/pets", "get"), ("/pets", "post"), ("/stores", "get")]
        );
    }
}
