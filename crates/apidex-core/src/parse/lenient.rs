//! `deserialize_with` helpers for fields that real-world documents often get
//! wrong. A malformed value degrades to the field's empty form instead of
//! failing the enclosing operation or document.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize as `T`, falling back to `T::default()` on a type mismatch.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        log::debug!("ignoring malformed field: {err}");
        T::default()
    }))
}

/// A scalar rendered as text. Numbers and booleans keep their JSON spelling,
/// so `version: 1.0` reads as `"1.0"`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// A non-negative count. Integral floats such as `1.0` are accepted.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    }))
}

/// The string members of an array. Anything else (`required: true` on a
/// property, for instance) reads as empty.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// A boolean flag; anything that is not `true` reads as `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// An array whose malformed elements are dropped.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value(item)
                    .map_err(|err| log::debug!("dropping malformed element: {err}"))
                    .ok()
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// A map whose malformed entries are dropped, keeping declaration order.
pub fn map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(key, item)| match serde_json::from_value(item) {
                Ok(parsed) => Some((key, parsed)),
                Err(err) => {
                    log::debug!("dropping malformed entry {key}: {err}");
                    None
                }
            })
            .collect(),
        _ => IndexMap::new(),
    })
}
