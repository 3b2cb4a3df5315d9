pub mod lenient;
pub mod openapi3;
pub mod ref_resolve;
pub mod schema;
pub mod spec;
pub mod swagger2;

use serde_json::Value;

use crate::error::ParseError;
use spec::Document;

/// Parse a Swagger 2.0 or OpenAPI 3.0 document from YAML.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    Document::from_value(&value)
}

/// Parse a Swagger 2.0 or OpenAPI 3.0 document from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    Document::from_value(&value)
}

/// Read raw document text into the JSON value model, trying JSON first and
/// falling back to YAML.
pub fn value_from_str(input: &str) -> Result<Value, ParseError> {
    match serde_json::from_str(input) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            log::debug!("content is not JSON ({json_err}), trying YAML");
            Ok(serde_yaml_ng::from_str(input)?)
        }
    }
}
