use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::lenient;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    /// Swagger 2.0 `formData` upload type.
    File,
}

/// The `type` field can be a single type, an array of types, or something
/// this crate does not recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
    Unknown(Value),
}

impl TypeSet {
    /// The type used for example synthesis: the first non-null member of a
    /// type array, or `null` when that is all there is.
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeSet::Single(t) => Some(t.clone()),
            TypeSet::Multiple(types) => types
                .iter()
                .find(|t| **t != SchemaType::Null)
                .or_else(|| types.first())
                .cloned(),
            TypeSet::Unknown(_) => None,
        }
    }
}

/// A reference or inline schema.
///
/// Any object carrying `$ref` deserializes as `Ref`; sibling keywords are
/// ignored, so a reference always wins over the fields next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(schema) => Some(schema),
            SchemaOrRef::Ref { .. } => None,
        }
    }
}

impl Default for SchemaOrRef {
    fn default() -> Self {
        SchemaOrRef::inline(Schema::default())
    }
}

/// A JSON-Schema-like node shared by Swagger 2.0 definitions and OpenAPI 3.0
/// component schemas.
///
/// Keywords are read leniently: a value of the wrong shape is dropped rather
/// than failing the whole node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    // Object properties
    #[serde(default, deserialize_with = "lenient::map", skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, deserialize_with = "lenient::string_list", skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    // Array items
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    // Composition
    #[serde(rename = "allOf", default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    // Enum values
    #[serde(rename = "enum", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    // Numeric constraints
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    // String constraints
    #[serde(rename = "minLength", default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Array constraints
    #[serde(rename = "minItems", default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "uniqueItems", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // Read/Write only
    #[serde(rename = "readOnly", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "writeOnly", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
}

impl Schema {
    /// An empty `type: object` schema, the starting point for synthetic
    /// parameter objects.
    pub fn object() -> Self {
        Schema {
            schema_type: Some(TypeSet::Single(SchemaType::Object)),
            ..Schema::default()
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }

    pub fn is_write_only(&self) -> bool {
        self.write_only.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_wins_over_siblings() {
        let node: SchemaOrRef =
            serde_json::from_value(json!({"$ref": "#/definitions/Pet", "type": "string"}))
                .unwrap();
        assert_eq!(
            node,
            SchemaOrRef::Ref {
                ref_path: "#/definitions/Pet".to_string()
            }
        );
    }

    #[test]
    fn unknown_type_is_kept() {
        let schema: Schema = serde_json::from_value(json!({"type": "decimal"})).unwrap();
        assert!(matches!(schema.schema_type, Some(TypeSet::Unknown(_))));
        assert_eq!(schema.schema_type.unwrap().primary(), None);
    }

    #[test]
    fn type_array_prefers_non_null() {
        let schema: Schema = serde_json::from_value(json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(
            schema.schema_type.unwrap().primary(),
            Some(SchemaType::Integer)
        );
    }

    #[test]
    fn integer_bounds_stay_integers() {
        let schema: Schema = serde_json::from_value(json!({"minimum": 5})).unwrap();
        assert_eq!(serde_json::to_value(schema.minimum).unwrap(), json!(5));
    }

    #[test]
    fn malformed_keywords_are_dropped() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "required": true,
            "minItems": 1.0,
            "maxLength": "ten",
            "readOnly": "no",
            "properties": {
                "name": {"type": "string", "required": true},
                "broken": "string"
            },
            "allOf": [{"type": "object"}, 7]
        }))
        .unwrap();
        assert!(schema.required.is_empty());
        assert_eq!(schema.min_items, Some(1));
        assert_eq!(schema.max_length, None);
        assert!(!schema.is_read_only());
        assert_eq!(schema.properties.keys().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(schema.all_of.len(), 1);
    }
}
