//! Inlining of cross-document references.
//!
//! Bundling runs in two phases. The first walks the root document and every
//! document it pulls in, loading each external location exactly once through
//! a [`DocumentLoader`]. The second rewrites the tree synchronously, replacing
//! every external `$ref` with the fragment it points at. References internal
//! to the root document are left for [`RefResolver`](crate::parse::ref_resolve::RefResolver).

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use serde_json::{Map, Value};
use url::Url;

use crate::error::BundleError;
use crate::parse::ref_resolve::lookup_pointer;

/// Source of external documents referenced by `$ref`.
pub trait DocumentLoader {
    /// Load the document at `location`, an absolute URL or a file path.
    fn load(&self, location: &str) -> impl Future<Output = Result<Value, BundleError>> + Send;
}

/// Loader that refuses every external location.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

impl DocumentLoader for LocalOnly {
    async fn load(&self, location: &str) -> Result<Value, BundleError> {
        Err(BundleError::Load {
            location: location.to_string(),
            message: "no loader configured for external references".to_string(),
        })
    }
}

/// Produce a self-contained copy of `doc`.
///
/// `base` is the location `doc` was read from; relative external references
/// resolve against it.
pub async fn bundle<L: DocumentLoader>(
    doc: &Value,
    loader: &L,
    base: Option<&str>,
) -> Result<Value, BundleError> {
    let mut pending = Vec::new();
    collect_locations(doc, base, &mut pending);
    if pending.is_empty() {
        return Ok(doc.clone());
    }

    let mut cache: HashMap<String, Value> = HashMap::new();
    while let Some(location) = pending.pop() {
        if cache.contains_key(&location) {
            continue;
        }
        log::debug!("loading external document {location}");
        let loaded = loader.load(&location).await?;
        collect_locations(&loaded, Some(&location), &mut pending);
        cache.insert(location, loaded);
    }

    let inliner = Inliner {
        cache: &cache,
        base,
    };
    inliner.inline(doc, None, &mut Vec::new())
}

/// Resolve the document part of a reference against the location of the
/// document containing it.
pub fn resolve_location(reference: &str, base: Option<&str>) -> String {
    if Url::parse(reference).is_ok_and(|url| url.scheme().len() > 1) {
        return reference.to_string();
    }
    let Some(base) = base else {
        return reference.to_string();
    };
    match Url::parse(base) {
        Ok(url) if url.scheme().len() > 1 => url
            .join(reference)
            .map(|joined| joined.to_string())
            .unwrap_or_else(|_| reference.to_string()),
        _ => Path::new(base)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(reference)
            .to_string_lossy()
            .into_owned(),
    }
}

/// Split a reference into its document part and fragment (without `#`).
fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((document, fragment)) => (document, fragment),
        None => (reference, ""),
    }
}

fn collect_locations(value: &Value, current: Option<&str>, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                let (document, _) = split_reference(reference);
                if !document.is_empty() {
                    out.push(resolve_location(document, current));
                }
            }
            for child in map.values() {
                collect_locations(child, current, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_locations(child, current, out);
            }
        }
        _ => {}
    }
}

struct Inliner<'c> {
    cache: &'c HashMap<String, Value>,
    base: Option<&'c str>,
}

impl Inliner<'_> {
    /// `current` is the location of the external document `value` belongs
    /// to, `None` for the root. `chain` holds the absolute references being
    /// inlined on the way here.
    fn inline(
        &self,
        value: &Value,
        current: Option<&str>,
        chain: &mut Vec<String>,
    ) -> Result<Value, BundleError> {
        match value {
            Value::Object(map) => {
                let reference = map.get("$ref").and_then(Value::as_str).map(str::to_string);
                if let Some(reference) = reference {
                    if let Some(inlined) = self.inline_reference(&reference, current, chain)? {
                        return Ok(inlined);
                    }
                }
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.inline(child, current, chain)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|child| self.inline(child, current, chain))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    /// Returns `None` for references internal to the root document.
    fn inline_reference(
        &self,
        reference: &str,
        current: Option<&str>,
        chain: &mut Vec<String>,
    ) -> Result<Option<Value>, BundleError> {
        let (document, fragment) = split_reference(reference);
        let location = match (document.is_empty(), current) {
            (false, Some(current)) => resolve_location(document, Some(current)),
            (false, None) => resolve_location(document, self.base),
            (true, Some(current)) => current.to_string(),
            (true, None) => return Ok(None),
        };

        let absolute = format!("{location}#{fragment}");
        if chain.contains(&absolute) {
            log::warn!("circular external reference detected: {absolute}");
            return Ok(Some(Value::Object(Map::new())));
        }

        let target = self
            .cache
            .get(&location)
            .ok_or_else(|| BundleError::Load {
                location: location.clone(),
                message: "document was not loaded".to_string(),
            })?;
        let pointer = fragment.strip_prefix('/').unwrap_or(fragment);
        let fragment_value = lookup_pointer(target, pointer, reference)?;

        chain.push(absolute);
        let inlined = self.inline(fragment_value, Some(&location), chain);
        chain.pop();
        inlined.map(Some)
    }
}
