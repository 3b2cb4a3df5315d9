use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::schema::{Schema, SchemaOrRef};
use crate::error::ResolveError;
use crate::example::generator::MAX_DEPTH;

/// Prefix every resolvable reference must carry.
pub const INTERNAL_REF_PREFIX: &str = "#/";

/// How many levels below a resolved target are expanded eagerly. Example
/// and skeleton synthesis never look past [`MAX_DEPTH`] + 1 levels, so
/// deeper references can stay unresolved.
pub const EAGER_DEPTH: usize = MAX_DEPTH + 1;

/// Resolves internal `$ref` pointers against a bundled document.
///
/// Cycle detection is per resolution chain: callers pass the set of
/// references already followed on the way to this node, and every branch
/// works on its own copy so sibling subtrees never see each other's
/// references.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    document: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// Walk the document to the node `reference` points at.
    pub fn lookup(&self, reference: &str) -> Result<&'a Value, ResolveError> {
        let pointer = reference
            .strip_prefix(INTERNAL_REF_PREFIX)
            .ok_or_else(|| ResolveError::UnsupportedReferenceFormat(reference.to_string()))?;
        lookup_pointer(self.document, pointer, reference)
    }

    /// Resolve a schema reference, returning `{}` when `reference` already
    /// appears in `visited`.
    ///
    /// Nested references in `properties` and `items` are resolved eagerly
    /// with the extended chain, down to [`EAGER_DEPTH`] levels below the
    /// target. Anything deeper stays a reference for the caller.
    pub fn resolve(
        &self,
        reference: &str,
        visited: &HashSet<String>,
    ) -> Result<Schema, ResolveError> {
        self.expand(reference, visited, 0)
    }

    fn expand(
        &self,
        reference: &str,
        visited: &HashSet<String>,
        level: usize,
    ) -> Result<Schema, ResolveError> {
        if !reference.starts_with(INTERNAL_REF_PREFIX) {
            return Err(ResolveError::UnsupportedReferenceFormat(
                reference.to_string(),
            ));
        }
        if visited.contains(reference) {
            log::warn!(
                "circular reference detected: {}",
                percent_decode_str(reference).decode_utf8_lossy()
            );
            return Ok(Schema::default());
        }

        let mut chain = visited.clone();
        chain.insert(reference.to_string());

        let target = self.lookup(reference)?;
        let node: SchemaOrRef =
            serde_json::from_value(target.clone()).map_err(|source| {
                ResolveError::InvalidTarget {
                    reference: reference.to_string(),
                    source,
                }
            })?;

        let mut schema = match node {
            SchemaOrRef::Ref { ref_path } => return self.expand(&ref_path, &chain, level),
            SchemaOrRef::Schema(schema) => *schema,
        };

        for prop in schema.properties.values_mut() {
            match prop {
                SchemaOrRef::Ref { .. } => self.expand_in_place(prop, &chain, level + 1)?,
                SchemaOrRef::Schema(inner) => {
                    if let Some(items) = inner.items.as_deref_mut() {
                        self.expand_in_place(items, &chain, level + 2)?;
                    }
                }
            }
        }
        if let Some(items) = schema.items.as_deref_mut() {
            self.expand_in_place(items, &chain, level + 1)?;
        }

        Ok(schema)
    }

    /// Resolve a reference to a non-schema component (parameter, response,
    /// request body) and deserialize it as `T`.
    pub fn resolve_as<T: DeserializeOwned>(&self, reference: &str) -> Result<T, ResolveError> {
        let target = self.lookup(reference)?;
        serde_json::from_value(target.clone()).map_err(|source| ResolveError::InvalidTarget {
            reference: reference.to_string(),
            source,
        })
    }

    fn expand_in_place(
        &self,
        slot: &mut SchemaOrRef,
        chain: &HashSet<String>,
        level: usize,
    ) -> Result<(), ResolveError> {
        if level > EAGER_DEPTH {
            return Ok(());
        }
        if let SchemaOrRef::Ref { ref_path } = slot {
            let resolved = self.expand(ref_path, chain, level)?;
            *slot = SchemaOrRef::inline(resolved);
        }
        Ok(())
    }
}

/// Walk `root` along a `/`-separated pointer (without the leading `#/`).
///
/// Segments are decoded before lookup. When an object has no exact match,
/// the first key whose percent-decoded form equals the segment is used.
/// Arrays are indexed by position.
pub fn lookup_pointer<'v>(
    root: &'v Value,
    pointer: &str,
    reference: &str,
) -> Result<&'v Value, ResolveError> {
    let mut current = root;
    if pointer.is_empty() {
        return Ok(current);
    }
    for raw in pointer.split('/') {
        let segment = decode_pointer_segment(raw);
        let next = match current {
            Value::Object(map) => map.get(&segment).or_else(|| {
                map.iter()
                    .find(|(key, _)| percent_decode_str(key).decode_utf8_lossy() == segment)
                    .map(|(_, value)| value)
            }),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| ResolveError::UnresolvedReference {
            segment: segment.clone(),
            reference: reference.to_string(),
        })?;
    }
    Ok(current)
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded).decode_utf8_lossy().into_owned()
}
