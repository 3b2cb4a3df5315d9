//! Compact endpoint listing grouped by tag, with a zero-valued response
//! skeleton in place of a synthesized example.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::DEFAULT_STATUS_CODE;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::Info;

/// Methods listed by [`simplify`].
pub const LISTED_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// Module name for operations without tags.
pub const UNCATEGORIZED: &str = "Uncategorized";

const MAX_SKELETON_DEPTH: usize = 3;
const MAX_SKELETON_ARRAY_DEPTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    pub info: Info,
    pub api_list: Vec<SimplifiedApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedApi {
    pub module: String,
    pub path: String,
    pub method: String,
    pub summary: String,
    pub parameters: Vec<ParameterSummary>,
    pub responses: ResponseSkeleton,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
}

/// Response envelope `{code, data, msg}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSkeleton {
    pub code: i64,
    pub data: Value,
    pub msg: String,
}

/// Flatten `doc` into a per-operation listing.
///
/// Works on the raw document and never fails: unreadable parameters are
/// skipped and unreadable response schemas produce `{}`.
pub fn simplify(doc: &Value) -> SimplifiedDoc {
    let resolver = RefResolver::new(doc);
    let openapi = doc
        .get("openapi")
        .or_else(|| doc.get("swagger"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let info: Info = doc
        .get("info")
        .and_then(|info| serde_json::from_value(info.clone()).ok())
        .unwrap_or_default();

    let mut api_list = Vec::new();
    let paths = doc.get("paths").and_then(Value::as_object);
    for (path, item) in paths.into_iter().flatten() {
        let Some(methods) = item.as_object() else {
            continue;
        };
        for (method, operation) in methods {
            if !LISTED_METHODS.contains(&method.to_lowercase().as_str()) {
                continue;
            }

            let module = operation
                .get("tags")
                .and_then(|tags| tags.get(0))
                .and_then(Value::as_str)
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            let summary = operation
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            api_list.push(SimplifiedApi {
                module,
                path: path.clone(),
                method: method.clone(),
                summary,
                parameters: parameter_summaries(&resolver, operation),
                responses: ResponseSkeleton {
                    code: 0,
                    data: response_skeleton(&resolver, operation),
                    msg: String::new(),
                },
            });
        }
    }

    SimplifiedDoc {
        openapi,
        info,
        api_list,
    }
}

/// Follow a `$ref` on a raw component, leaving anything else untouched.
fn deref<'a>(resolver: &RefResolver<'a>, value: &'a Value) -> Option<&'a Value> {
    match value.get("$ref").and_then(Value::as_str) {
        Some(reference) => resolver.lookup(reference).ok(),
        None => Some(value),
    }
}

fn parameter_summaries(resolver: &RefResolver<'_>, operation: &Value) -> Vec<ParameterSummary> {
    let Some(params) = operation.get("parameters").and_then(Value::as_array) else {
        return Vec::new();
    };
    params
        .iter()
        .filter_map(|raw| deref(resolver, raw))
        .filter_map(|param| {
            let text = |key: &str| param.get(key).and_then(Value::as_str);
            let param_type = param
                .get("schema")
                .and_then(|schema| schema.get("type"))
                .or_else(|| param.get("type"))
                .and_then(type_name)
                .unwrap_or("string");
            Some(ParameterSummary {
                name: text("name")?.to_string(),
                location: text("in").unwrap_or_default().to_string(),
                required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
                param_type: param_type.to_string(),
            })
        })
        .collect()
}

fn type_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name),
        Value::Array(names) => names.iter().find_map(Value::as_str),
        _ => None,
    }
}

fn response_skeleton(resolver: &RefResolver<'_>, operation: &Value) -> Value {
    let schema = operation
        .get("responses")
        .and_then(|responses| responses.get(DEFAULT_STATUS_CODE))
        .and_then(|response| deref(resolver, response))
        .and_then(|response| {
            response.get("schema").or_else(|| {
                response
                    .get("content")
                    .and_then(Value::as_object)
                    .and_then(|content| content.values().next())
                    .and_then(|media| media.get("schema"))
            })
        })
        .and_then(|schema| serde_json::from_value::<SchemaOrRef>(schema.clone()).ok());

    match schema {
        Some(schema) => Skeleton { resolver: *resolver }.node(&schema, 0, &HashSet::new()),
        None => Value::Object(Map::new()),
    }
}

/// Zero-valued rendering of a schema: `""`, `0`, `false`, one-element arrays.
struct Skeleton<'a> {
    resolver: RefResolver<'a>,
}

impl Skeleton<'_> {
    fn node(&self, node: &SchemaOrRef, depth: usize, visited: &HashSet<String>) -> Value {
        match node {
            SchemaOrRef::Ref { ref_path } => match self.resolver.resolve(ref_path, visited) {
                Ok(schema) => {
                    let mut chain = visited.clone();
                    chain.insert(ref_path.clone());
                    self.schema(&schema, depth, &chain)
                }
                Err(err) => {
                    log::debug!("skeleton skips {ref_path}: {err}");
                    Value::Object(Map::new())
                }
            },
            SchemaOrRef::Schema(schema) => self.schema(schema, depth, visited),
        }
    }

    fn schema(&self, schema: &Schema, depth: usize, visited: &HashSet<String>) -> Value {
        let schema_type = match schema.schema_type {
            Some(ref types) => types.primary(),
            None if !schema.properties.is_empty() => Some(SchemaType::Object),
            None if schema.items.is_some() => Some(SchemaType::Array),
            None => Some(SchemaType::Object),
        };

        if depth > MAX_SKELETON_DEPTH {
            return match schema_type {
                Some(SchemaType::Object) => Value::Object(Map::new()),
                _ => Value::String(String::new()),
            };
        }

        match schema_type {
            Some(SchemaType::Object) => Value::Object(
                schema
                    .properties
                    .iter()
                    .map(|(name, prop)| (name.clone(), self.node(prop, depth + 1, visited)))
                    .collect(),
            ),
            Some(SchemaType::Array) => {
                if depth > MAX_SKELETON_ARRAY_DEPTH {
                    return Value::Array(Vec::new());
                }
                let item = match schema.items.as_deref() {
                    Some(items) => self.node(items, depth + 1, visited),
                    None => Value::String(String::new()),
                };
                Value::Array(vec![item])
            }
            Some(SchemaType::Integer | SchemaType::Number) => Value::from(0),
            Some(SchemaType::Boolean) => Value::Bool(false),
            _ => Value::String(String::new()),
        }
    }
}
