use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::schema::SchemaOrRef;
use super::spec::{Info, Tag};

/// Top-level OpenAPI 3.x document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi3Spec {
    pub openapi: String,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Components object holding reusable definitions, kept raw: entries are
/// typed when a reference to them is resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Value>,

    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    #[serde(deserialize_with = "lenient::or_default")]
    pub request_bodies: IndexMap<String, Value>,
}

/// An OpenAPI 3.x operation.
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

    #[serde(rename = "requestBody", default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(default, deserialize_with = "lenient::map", skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// An API parameter.
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

    #[serde(default, deserialize_with = "lenient::map", skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Parameter {
    /// The parameter's `schema`, or the schema of its first `content` entry.
    pub fn value_schema(&self) -> Option<&SchemaOrRef> {
        self.schema
            .as_ref()
            .or_else(|| first_media_schema(&self.content))
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

/// A media type object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::map")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub required: bool,
}

/// A reference or inline request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::map", skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
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

/// Only the first declared media type is consulted; its schema may be absent.
pub fn first_media_schema(content: &IndexMap<String, MediaType>) -> Option<&SchemaOrRef> {
    content.first().and_then(|(_, media)| media.schema.as_ref())
}
