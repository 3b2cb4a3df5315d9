pub mod openapi3;
pub mod swagger2;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AdapterError;
use crate::example::merge_schemas;
use crate::parse::lenient;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::{PATH_PARAMETERS_KEY, PathItem};

pub use openapi3::OpenApi3Adapter;
pub use swagger2::Swagger2Adapter;

/// Status code whose response is synthesized for every operation.
pub const DEFAULT_STATUS_CODE: &str = "200";

/// Which side of an exchange to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.write_str("request"),
            Direction::Response => f.write_str("response"),
        }
    }
}

/// Where a request example is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Header,
    Query,
    Body,
    Form,
}

/// One synthesized side of an operation.
///
/// A request with no usable parameters has neither field set. A response
/// always carries `data`, `{}` when no schema is declared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Exchange {
    pub data: Option<Value>,
    pub req_type: Option<RequestType>,
}

impl Exchange {
    pub fn request(data: Value, req_type: RequestType) -> Self {
        Self {
            data: Some(data),
            req_type: Some(req_type),
        }
    }

    pub fn response(data: Value) -> Self {
        Self {
            data: Some(data),
            req_type: None,
        }
    }
}

/// Extracts the schemas relevant to one side of an operation and hands them
/// to the example generator.
pub trait DialectAdapter {
    fn request(&self, path: &str, method: &str) -> Result<Exchange, AdapterError>;

    fn response(&self, path: &str, method: &str, status_code: &str)
    -> Result<Exchange, AdapterError>;

    fn exchange(
        &self,
        path: &str,
        method: &str,
        direction: Direction,
        status_code: &str,
    ) -> Result<Exchange, AdapterError> {
        match direction {
            Direction::Request => self.request(path, method),
            Direction::Response => self.response(path, method, status_code),
        }
    }
}

/// Find `path` and `method` (case-insensitive) and type the operation.
pub(crate) fn locate<'v, O: DeserializeOwned>(
    document: &'v Value,
    path: &str,
    method: &str,
) -> Result<(O, &'v PathItem), AdapterError> {
    let item = document
        .get("paths")
        .and_then(|paths| paths.get(path))
        .and_then(Value::as_object)
        .ok_or_else(|| AdapterError::PathNotFound(path.to_string()))?;

    let operation = item
        .get(&method.to_lowercase())
        .ok_or_else(|| AdapterError::MethodNotFound {
            path: path.to_string(),
            method: method.to_string(),
        })?;

    let operation = serde_json::from_value(operation.clone()).map_err(|source| {
        AdapterError::InvalidOperation {
            path: path.to_string(),
            method: method.to_string(),
            source,
        }
    })?;
    Ok((operation, item))
}

/// Parameters declared on the path item itself. Malformed entries are skipped.
pub(crate) fn shared_parameters<P: DeserializeOwned>(
    item: &Map<String, Value>,
    path: &str,
) -> Result<Vec<P>, AdapterError> {
    match item.get(PATH_PARAMETERS_KEY) {
        Some(raw) => lenient::list(raw.clone()).map_err(|source| {
            AdapterError::InvalidOperation {
                path: path.to_string(),
                method: PATH_PARAMETERS_KEY.to_string(),
                source,
            }
        }),
        None => Ok(Vec::new()),
    }
}

/// Path-level parameters, minus those the operation redeclares, followed by
/// the operation's own.
pub(crate) fn override_parameters<P, K: PartialEq>(
    shared: Vec<P>,
    own: Vec<P>,
    key: impl Fn(&P) -> K,
) -> Vec<P> {
    let mut effective: Vec<P> = shared
        .into_iter()
        .filter(|candidate| !own.iter().any(|p| key(p) == key(candidate)))
        .collect();
    effective.extend(own);
    effective
}

/// Build the synthetic object schema for a parameter group: one property per
/// parameter carrying a schema, `required` from each parameter's flag.
pub(crate) fn parameter_object<I>(parameters: I) -> Schema
where
    I: IntoIterator<Item = (String, Option<SchemaOrRef>, bool)>,
{
    parameters
        .into_iter()
        .fold(Schema::object(), |acc, (name, schema, required)| {
            let mut fragment = Schema::default();
            if required {
                fragment.required.push(name.clone());
            }
            if let Some(schema) = schema {
                fragment.properties.insert(name, schema);
            }
            merge_schemas(&acc, &fragment)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::{SchemaType, TypeSet};
    use serde_json::json;

    #[test]
    fn locate_reports_missing_path_and_method() {
        let doc = json!({"paths": {"/pets": {"get": {}}}});
        let err = locate::<Value>(&doc, "/cats", "get").unwrap_err();
        assert!(matches!(err, AdapterError::PathNotFound(ref p) if p == "/cats"));

        let err = locate::<Value>(&doc, "/pets", "delete").unwrap_err();
        assert!(matches!(err, AdapterError::MethodNotFound { .. }));

        assert!(locate::<Value>(&doc, "/pets", "GET").is_ok());
    }

    #[test]
    fn operation_overrides_shared_parameter() {
        let shared = vec![("limit", "query", 1), ("trace", "header", 2)];
        let own = vec![("limit", "query", 3)];
        let effective = override_parameters(shared, own, |p| (p.0, p.1));
        assert_eq!(effective, vec![("trace", "header", 2), ("limit", "query", 3)]);
    }

    #[test]
    fn parameter_object_collects_required() {
        let schema = parameter_object(vec![
            ("id".to_string(), Some(SchemaOrRef::default()), true),
            ("q".to_string(), Some(SchemaOrRef::default()), false),
            ("bare".to_string(), None, true),
        ]);
        assert_eq!(schema.schema_type, Some(TypeSet::Single(SchemaType::Object)));
        assert_eq!(schema.required, vec!["id", "bare"]);
        let names: Vec<&str> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "q"]);
    }

    #[test]
    fn request_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RequestType::Form).unwrap(), json!("form"));
        assert_eq!(Direction::Response.to_string(), "response");
    }
}
