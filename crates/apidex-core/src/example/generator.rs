use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::merge::merge_schemas;
use super::options::ParserOptions;
use crate::error::ResolveError;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};

/// Object synthesis below this depth yields `{}`; arrays yield `[]`.
pub const MAX_DEPTH: usize = 3;

/// Arrays nested inside this many enclosing arrays collapse to `[]`.
pub const MAX_ARRAY_NESTING: usize = 2;

/// Upper bound on the number of repeated items in a synthesized array.
pub const MAX_ARRAY_ITEMS: u64 = 100;

/// Turns schema nodes into example values.
///
/// One generator is built per document and per options value. Generation is
/// pure apart from the current date used by the `date` and `date-time`
/// formats.
#[derive(Debug, Clone, Copy)]
pub struct ExampleGenerator<'a> {
    resolver: RefResolver<'a>,
    options: ParserOptions,
}

/// Traversal state for one branch of the schema tree.
#[derive(Debug, Clone, Default)]
struct Frame {
    depth: usize,
    array_depth: usize,
    visited: HashSet<String>,
}

impl Frame {
    fn descend(&self) -> Frame {
        Frame {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    fn enter_array(&self) -> Frame {
        Frame {
            depth: self.depth + 1,
            array_depth: self.array_depth + 1,
            visited: self.visited.clone(),
        }
    }

    fn follow(mut self, reference: &str) -> Frame {
        self.visited.insert(reference.to_string());
        self
    }
}

impl<'a> ExampleGenerator<'a> {
    /// `document` is the bundled document every `$ref` resolves against.
    pub fn new(document: &'a Value, options: ParserOptions) -> Self {
        Self {
            resolver: RefResolver::new(document),
            options,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn resolver(&self) -> RefResolver<'a> {
        self.resolver
    }

    /// Synthesize an example for `schema`.
    pub fn generate(&self, schema: &SchemaOrRef) -> Result<Value, ResolveError> {
        self.generate_at(schema, &Frame::default())
    }

    fn generate_at(&self, schema: &SchemaOrRef, frame: &Frame) -> Result<Value, ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                let resolved = self.resolver.resolve(ref_path, &frame.visited)?;
                let next = frame.clone().follow(ref_path);
                self.generate_schema(&resolved, &next)
            }
            SchemaOrRef::Schema(inner) => self.generate_schema(inner, frame),
        }
    }

    fn generate_schema(&self, schema: &Schema, frame: &Frame) -> Result<Value, ResolveError> {
        if let Some(ref example) = schema.example {
            return Ok(example.clone());
        }
        if let Some(ref default) = schema.default_value {
            return Ok(default.clone());
        }
        if let Some(first) = schema.enum_values.first() {
            return Ok(first.clone());
        }

        if !schema.all_of.is_empty() {
            let (merged, next) = self.flatten_all_of(schema, frame)?;
            return self.generate_schema(&merged, &next);
        }

        let untyped =
            schema.schema_type.is_none() && schema.properties.is_empty() && schema.items.is_none();
        if untyped {
            if let Some(first) = schema.one_of.first().or_else(|| schema.any_of.first()) {
                return self.generate_at(first, frame);
            }
        }

        let schema_type = match schema.schema_type {
            Some(ref types) => types.primary(),
            None => Some(infer_type(schema)),
        };

        match schema_type {
            Some(SchemaType::Object) => self.object_example(schema, frame),
            Some(SchemaType::Array) => self.array_example(schema, frame),
            Some(SchemaType::String) => Ok(string_example(schema)),
            Some(SchemaType::Number | SchemaType::Integer) => Ok(number_example(schema)),
            Some(SchemaType::Boolean) => Ok(Value::Bool(true)),
            Some(SchemaType::Null) => Ok(Value::Null),
            Some(SchemaType::File) | None => Ok(Value::String(String::new())),
        }
    }

    /// Merge every `allOf` part, then overlay the node's own keywords.
    fn flatten_all_of(&self, schema: &Schema, frame: &Frame) -> Result<(Schema, Frame), ResolveError> {
        let mut next = frame.clone();
        let mut merged = Schema::default();
        for part in &schema.all_of {
            let part = match part {
                SchemaOrRef::Ref { ref_path } => {
                    let resolved = self.resolver.resolve(ref_path, &next.visited)?;
                    next = next.follow(ref_path);
                    resolved
                }
                SchemaOrRef::Schema(inner) => inner.as_ref().clone(),
            };
            let part = if part.all_of.is_empty() {
                part
            } else {
                let (flat, after) = self.flatten_all_of(&part, &next)?;
                next = after;
                flat
            };
            merged = merge_schemas(&merged, &part);
        }

        let own = Schema {
            all_of: Vec::new(),
            ..schema.clone()
        };
        Ok((merge_schemas(&merged, &own), next))
    }

    fn object_example(&self, schema: &Schema, frame: &Frame) -> Result<Value, ResolveError> {
        let mut result = Map::new();
        if frame.depth > MAX_DEPTH {
            log::debug!("object depth cap reached at depth {}", frame.depth);
            return Ok(Value::Object(result));
        }

        for (name, prop) in &schema.properties {
            if self.options.required_only && !schema.required.contains(name) {
                continue;
            }

            let (resolved, child) = match prop {
                SchemaOrRef::Ref { ref_path } => (
                    Cow::Owned(self.resolver.resolve(ref_path, &frame.visited)?),
                    frame.descend().follow(ref_path),
                ),
                SchemaOrRef::Schema(inner) => (Cow::Borrowed(inner.as_ref()), frame.descend()),
            };

            if !self.options.include_read_only && resolved.is_read_only() {
                continue;
            }
            if !self.options.include_write_only && resolved.is_write_only() {
                continue;
            }

            result.insert(name.clone(), self.generate_schema(&resolved, &child)?);
        }

        Ok(Value::Object(result))
    }

    fn array_example(&self, schema: &Schema, frame: &Frame) -> Result<Value, ResolveError> {
        if frame.depth > MAX_DEPTH || frame.array_depth >= MAX_ARRAY_NESTING {
            log::debug!(
                "array cap reached at depth {} (nesting {})",
                frame.depth,
                frame.array_depth
            );
            return Ok(Value::Array(Vec::new()));
        }

        let count = schema
            .min_items
            .unwrap_or(0)
            .max(self.options.default_min_items)
            .min(MAX_ARRAY_ITEMS) as usize;
        if count == 0 {
            return Ok(Value::Array(Vec::new()));
        }

        let child = frame.enter_array();
        let item = match schema.items.as_deref() {
            Some(items) => self.generate_at(items, &child)?,
            None => Value::Object(Map::new()),
        };
        Ok(Value::Array(vec![item; count]))
    }
}

/// Type used when a node declares none.
fn infer_type(schema: &Schema) -> SchemaType {
    if !schema.properties.is_empty() {
        SchemaType::Object
    } else if schema.items.is_some() {
        SchemaType::Array
    } else {
        SchemaType::Object
    }
}

fn string_example(schema: &Schema) -> Value {
    let literal = match schema.format.as_deref() {
        Some("email") => "user@example.com".to_string(),
        Some("uri" | "url") => "http://example.com".to_string(),
        Some("date") => Utc::now().format("%Y-%m-%d").to_string(),
        Some("date-time") => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        Some("password") => "********".to_string(),
        Some("binary") => "(binary)".to_string(),
        Some("byte") => "U3dhZ2dlciByb2Nrcw==".to_string(),
        Some("uuid") => "123e4567-e89b-12d3-a456-426614174000".to_string(),
        _ => schema
            .pattern
            .clone()
            .unwrap_or_else(|| "string".to_string()),
    };
    Value::String(literal)
}

fn number_example(schema: &Schema) -> Value {
    match schema.minimum.as_ref().or(schema.maximum.as_ref()) {
        Some(bound) => Value::Number(bound.clone()),
        None => Value::from(0),
    }
}
