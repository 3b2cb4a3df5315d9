pub mod generator;
pub mod merge;
pub mod options;

use serde_json::Value;

use crate::error::ResolveError;
use crate::parse::schema::SchemaOrRef;

pub use generator::ExampleGenerator;
pub use merge::merge_schemas;
pub use options::ParserOptions;

/// Synthesize an example for a standalone schema value.
///
/// References resolve against `schema` itself, so a schema that carries its
/// own `definitions` can point into them with `#/definitions/...`.
pub fn generate_example(schema: &Value, options: ParserOptions) -> Result<Value, ResolveError> {
    let node: SchemaOrRef =
        serde_json::from_value(schema.clone()).map_err(|source| ResolveError::InvalidTarget {
            reference: "#".to_string(),
            source,
        })?;
    ExampleGenerator::new(schema, options).generate(&node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standalone_schema_resolves_against_itself() {
        let schema = json!({
            "type": "object",
            "properties": {"owner": {"$ref": "#/definitions/User"}},
            "definitions": {
                "User": {"type": "object", "properties": {"email": {"type": "string", "format": "email"}}}
            }
        });
        let example = generate_example(&schema, ParserOptions::default()).unwrap();
        assert_eq!(example, json!({"owner": {"email": "user@example.com"}}));
    }

    #[test]
    fn non_schema_value_is_rejected() {
        let err = generate_example(&json!("nope"), ParserOptions::default()).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidTarget { .. }));
    }
}
