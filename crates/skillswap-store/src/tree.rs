//! JSON tree operations with the store's storage rules
//!
//! The store never keeps `null` or empty objects: writing `null` deletes,
//! and a parent whose last child is removed disappears with it. Arrays are
//! kept as written but become index-keyed objects once a path reaches into
//! them.

use crate::path::StorePath;
use serde_json::{Map, Value};

/// Drop nulls and empty objects, recursively; `None` when nothing is left
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        Value::Array(items) if items.is_empty() => None,
        other => Some(other),
    }
}

/// Read the value at `path`
pub fn get(root: &Value, path: &StorePath) -> Option<Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    normalize(node.clone())
}

/// Overwrite the value at `path`; `null` removes it
pub fn set(root: &mut Value, path: &StorePath, value: Value) {
    set_in(root, path.segments(), normalize(value));
    if is_empty_node(root) {
        *root = Value::Null;
    }
}

/// Remove the value at `path` and any parents it leaves empty
pub fn remove(root: &mut Value, path: &StorePath) {
    set(root, path, Value::Null);
}

/// Merge `fields` into the object at `path`
///
/// Keys may be relative paths (`"a/b"`); each one is written as by [`set`].
pub fn update(
    root: &mut Value,
    path: &StorePath,
    fields: Map<String, Value>,
) -> Result<(), skillswap_core::CoreError> {
    let targets = fields
        .into_iter()
        .map(|(key, value)| Ok((path.join(&key)?, value)))
        .collect::<Result<Vec<_>, skillswap_core::CoreError>>()?;
    for (target, value) in targets {
        set(root, &target, value);
    }
    Ok(())
}

fn is_empty_node(node: &Value) -> bool {
    match node {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn set_in(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if let Value::Array(items) = node {
        let indexed: Map<String, Value> = items
            .drain(..)
            .enumerate()
            .map(|(idx, item)| (idx.to_string(), item))
            .collect();
        *node = Value::Object(indexed);
    }
    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(first.clone(), v);
            }
            None => {
                map.remove(first);
            }
        }
        return;
    }

    if value.is_none() && !map.contains_key(first) {
        return;
    }
    let child = map.entry(first.clone()).or_insert(Value::Null);
    set_in(child, rest, value);
    if is_empty_node(child) {
        map.remove(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[test]
    fn test_set_creates_parents() {
        let mut root = Value::Null;
        set(&mut root, &p("ratings/t1/r1"), json!({"rating": 4}));
        assert_eq!(root, json!({"ratings": {"t1": {"r1": {"rating": 4}}}}));
        assert_eq!(get(&root, &p("ratings/t1/r1/rating")), Some(json!(4)));
        assert_eq!(get(&root, &p("ratings/t2")), None);
    }

    #[test]
    fn test_remove_prunes_empty_parents() {
        let mut root = json!({"favorites": {"u1": {"t1": "t1"}}, "users": {"u1": {"name": "A"}}});
        remove(&mut root, &p("favorites/u1/t1"));
        assert_eq!(root, json!({"users": {"u1": {"name": "A"}}}));

        remove(&mut root, &p("users/u1"));
        assert_eq!(root, Value::Null);
        assert_eq!(get(&root, &StorePath::root()), None);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut root = json!({"users": {"u1": {"name": "A"}}});
        remove(&mut root, &p("users/u2/name"));
        assert_eq!(root, json!({"users": {"u1": {"name": "A"}}}));
    }

    #[test]
    fn test_set_null_and_empty_object_delete() {
        let mut root = json!({"topics": {"go": {"name": "Go"}}});
        set(&mut root, &p("topics/go"), json!({"name": null}));
        assert_eq!(root, Value::Null);
    }

    #[test]
    fn test_update_merges() {
        let mut root = json!({"users": {"u1": {"name": "A", "bio": "x"}}});
        let mut fields = Map::new();
        fields.insert("bio".to_string(), json!("y"));
        fields.insert("extra/deep".to_string(), json!(true));
        update(&mut root, &p("users/u1"), fields).unwrap();
        assert_eq!(
            root,
            json!({"users": {"u1": {"name": "A", "bio": "y", "extra": {"deep": true}}}})
        );
    }

    #[test]
    fn test_write_into_array_converts_to_object() {
        let mut root = json!({"skills": ["a", "b", "c"]});
        remove(&mut root, &p("skills/1"));
        assert_eq!(root, json!({"skills": {"0": "a", "2": "c"}}));
        assert_eq!(get(&root, &p("skills/2")), Some(json!("c")));
    }
}
