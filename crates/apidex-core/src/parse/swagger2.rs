use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::lenient;
use super::schema::{Schema, SchemaOrRef, TypeSet};
use super::spec::{Info, Tag};

/// Top-level Swagger 2.0 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swagger2Spec {
    pub swagger: String,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(rename = "basePath", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// A Swagger 2.0 operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(default, deserialize_with = "lenient::map", skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterLocation {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "body")]
    Body,
}

/// A Swagger 2.0 parameter. Non-body parameters describe their value inline
/// (`type`, `format`, `items`, ...); body parameters carry a `schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub required: bool,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<TypeSet>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(rename = "enum", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
}

impl Parameter {
    /// The schema describing this parameter's value: the explicit `schema`
    /// when present, otherwise one assembled from the inline fields.
    pub fn to_schema(&self) -> SchemaOrRef {
        if let Some(ref schema) = self.schema {
            return schema.clone();
        }
        SchemaOrRef::inline(Schema {
            schema_type: self.param_type.clone(),
            format: self.format.clone(),
            description: self.description.clone(),
            default_value: self.default_value.clone(),
            example: self.example.clone(),
            enum_values: self.enum_values.clone(),
            items: self.items.clone(),
            minimum: self.minimum.clone(),
            maximum: self.maximum.clone(),
            ..Schema::default()
        })
    }
}

/// A reference or inline parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(Parameter),
}

/// A Swagger 2.0 response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}
