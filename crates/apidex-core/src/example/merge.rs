use crate::parse::schema::{Schema, SchemaOrRef};

/// Merge `source` into a copy of `target`.
///
/// Scalar keywords present in `source` overwrite `target`, including `0`,
/// `false` and `""`. `enum` and `required` are unioned without duplicates.
/// Inline `properties` and `items` merge recursively; a reference on either
/// side is replaced by the source node.
pub fn merge_schemas(target: &Schema, source: &Schema) -> Schema {
    let mut result = target.clone();

    macro_rules! overwrite {
        ($($field:ident),* $(,)?) => {
            $(
                if source.$field.is_some() {
                    result.$field = source.$field.clone();
                }
            )*
        };
    }
    overwrite!(
        schema_type,
        format,
        title,
        description,
        pattern,
        example,
        default_value,
        minimum,
        maximum,
        min_length,
        max_length,
        min_items,
        max_items,
        unique_items,
        read_only,
        write_only,
    );

    union_into(&mut result.enum_values, &source.enum_values);
    union_into(&mut result.required, &source.required);

    for (name, incoming) in &source.properties {
        let merged = match (result.properties.get(name), incoming) {
            (Some(SchemaOrRef::Schema(existing)), SchemaOrRef::Schema(incoming)) => {
                SchemaOrRef::inline(merge_schemas(existing, incoming))
            }
            _ => incoming.clone(),
        };
        result.properties.insert(name.clone(), merged);
    }

    if let Some(ref incoming) = source.items {
        let merged = match (result.items.as_deref(), incoming.as_ref()) {
            (Some(SchemaOrRef::Schema(existing)), SchemaOrRef::Schema(incoming)) => {
                SchemaOrRef::inline(merge_schemas(existing, incoming))
            }
            _ => incoming.as_ref().clone(),
        };
        result.items = Some(Box::new(merged));
    }

    result
}

/// Append every element of `source` not already in `target`.
fn union_into<T: PartialEq + Clone>(target: &mut Vec<T>, source: &[T]) {
    for item in source {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scalars_overwrite() {
        let merged = merge_schemas(
            &schema(json!({"type": "string", "format": "email", "pattern": "^a"})),
            &schema(json!({"format": "uuid"})),
        );
        assert_eq!(merged.format.as_deref(), Some("uuid"));
        assert_eq!(merged.pattern.as_deref(), Some("^a"));
    }

    #[test]
    fn falsy_scalars_are_present() {
        let merged = merge_schemas(
            &schema(json!({"example": 5, "default": true})),
            &schema(json!({"example": 0, "default": false})),
        );
        assert_eq!(merged.example, Some(json!(0)));
        assert_eq!(merged.default_value, Some(json!(false)));
    }

    #[test]
    fn enum_and_required_are_unioned() {
        let merged = merge_schemas(
            &schema(json!({"enum": ["a", "b"], "required": ["id"]})),
            &schema(json!({"enum": ["b", "c"], "required": ["id", "name"]})),
        );
        assert_eq!(merged.enum_values, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(merged.required, vec!["id", "name"]);
    }

    #[test]
    fn properties_merge_recursively() {
        let merged = merge_schemas(
            &schema(json!({"properties": {"id": {"type": "integer"}, "name": {"type": "string"}}})),
            &schema(json!({"properties": {"id": {"minimum": 1}, "tag": {"$ref": "#/definitions/Tag"}}})),
        );
        let keys: Vec<&str> = merged.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "tag"]);
        let id = merged.properties["id"].as_schema().unwrap();
        assert!(id.schema_type.is_some());
        assert_eq!(id.minimum, Some(1.into()));
        assert!(merged.properties["tag"].as_schema().is_none());
    }

    #[test]
    fn items_merge_recursively() {
        let merged = merge_schemas(
            &schema(json!({"type": "array", "items": {"type": "string"}})),
            &schema(json!({"items": {"format": "date"}})),
        );
        let items = merged.items.as_deref().unwrap().as_schema().unwrap();
        assert!(items.schema_type.is_some());
        assert_eq!(items.format.as_deref(), Some("date"));
    }

    #[test]
    fn union_sets_are_associative() {
        let samples = [
            schema(json!({})),
            schema(json!({"enum": [1, 2], "required": ["a"]})),
            schema(json!({"enum": [2, 3], "required": ["b", "a"]})),
            schema(json!({"enum": ["x", 1], "required": ["c"]})),
            schema(json!({"enum": [null, 3], "required": []})),
        ];
        let as_sets = |s: &Schema| {
            let mut enums: Vec<String> = s.enum_values.iter().map(Value::to_string).collect();
            enums.sort();
            let mut required = s.required.clone();
            required.sort();
            (enums, required)
        };

        for a in &samples {
            for b in &samples {
                for c in &samples {
                    let left = merge_schemas(&merge_schemas(a, b), c);
                    let right = merge_schemas(a, &merge_schemas(b, c));
                    assert_eq!(as_sets(&left), as_sets(&right));
                }
            }
        }
    }
}
