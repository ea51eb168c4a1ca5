//! Nested filter maps

use crate::types::{JsonObject, JsonValue};

/// Return `map` with `value` stored under a nested property path.
///
/// Path segments are separated by dots or written in brackets, so
/// `"author.name"` and `"author[name]"` both yield
/// `{"author": {"name": value}}`. Intermediate values that are not objects
/// are replaced by objects.
pub fn set_nested_value(mut map: JsonObject, path: &str, value: JsonValue) -> JsonObject {
    let segments: Vec<&str> = path
        .split(['.', '[', ']'])
        .filter(|s| !s.is_empty())
        .collect();
    insert_path(&mut map, &segments, value);
    map
}

fn insert_path(map: &mut JsonObject, segments: &[&str], value: JsonValue) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| JsonValue::Object(JsonObject::new()));
            if !entry.is_object() {
                *entry = JsonValue::Object(JsonObject::new());
            }
            if let JsonValue::Object(inner) = entry {
                insert_path(inner, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod filter_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: JsonValue) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flat_key() {
        let map = set_nested_value(JsonObject::new(), "title", json!("Dune"));
        assert_eq!(JsonValue::Object(map), json!({"title": "Dune"}));
    }

    #[test]
    fn test_dotted_key() {
        let map = set_nested_value(JsonObject::new(), "author.name", json!("Doe"));
        assert_eq!(JsonValue::Object(map), json!({"author": {"name": "Doe"}}));
    }

    #[test]
    fn test_bracket_key() {
        let map = set_nested_value(JsonObject::new(), "order[title]", json!("asc"));
        assert_eq!(JsonValue::Object(map), json!({"order": {"title": "asc"}}));
    }

    #[test]
    fn test_merges_into_existing_object() {
        let map = object(json!({"author": {"name": "Doe"}}));
        let map = set_nested_value(map, "author.country", json!("FR"));
        assert_eq!(
            JsonValue::Object(map),
            json!({"author": {"name": "Doe", "country": "FR"}})
        );
    }

    #[test]
    fn test_replaces_scalar_intermediate() {
        let map = object(json!({"author": "Doe"}));
        let map = set_nested_value(map, "author.name", json!("Roe"));
        assert_eq!(JsonValue::Object(map), json!({"author": {"name": "Roe"}}));
    }

    #[test]
    fn test_overwrites_leaf() {
        let map = object(json!({"page": 1}));
        let map = set_nested_value(map, "page", json!(2));
        assert_eq!(JsonValue::Object(map), json!({"page": 2}));
    }

    #[test]
    fn test_empty_path_is_noop() {
        let map = object(json!({"a": 1}));
        let map = set_nested_value(map, "", json!(2));
        assert_eq!(JsonValue::Object(map), json!({"a": 1}));
    }
}
