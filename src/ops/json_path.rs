//! Path-addressed reads and copy-on-write updates over [`JsonValue`] trees.
//!
//! None of these operations fail. The shape of a parameter file is owned by
//! the external tool, so a path that does not fit the document reads as
//! absent and writes degrade to a no-op instead of raising an error.

use std::sync::Arc;

use crate::model::path::{JsonPath, Segment};
use crate::model::value::{JsonMap, JsonValue};

/// Value at `path`, or `None` as soon as a segment does not resolve.
pub fn get<'a>(root: &'a JsonValue, path: &[Segment]) -> Option<&'a JsonValue> {
    path.iter().try_fold(root, |node, segment| node.child(segment))
}

/// Copy of `root` with the node at `path` replaced by `value`.
///
/// Only the containers on the path are copied; every sibling subtree keeps its
/// storage. An empty path replaces the whole tree. A missing object key is
/// created, and a missing intermediate key gets a fresh empty object so new
/// nested fields can be populated. Anything else that does not fit (an index
/// out of bounds, a key under an array, descending into a scalar) leaves
/// `root` unchanged.
pub fn set(root: &JsonValue, path: &[Segment], value: JsonValue) -> JsonValue {
    set_inner(root, path, value).unwrap_or_else(|| root.clone())
}

fn set_inner(node: &JsonValue, path: &[Segment], value: JsonValue) -> Option<JsonValue> {
    let Some((head, rest)) = path.split_first() else {
        return Some(value);
    };
    match (node, head) {
        (JsonValue::Object(map), Segment::Key(key)) => {
            let child = match map.get(key) {
                Some(existing) => set_inner(existing, rest, value)?,
                None => synthesize(rest, value)?,
            };
            let mut next = JsonMap::clone(map);
            next.insert(key.clone(), child);
            Some(JsonValue::Object(Arc::new(next)))
        }
        (JsonValue::Array(items), Segment::Index(i)) => {
            let existing = items.get(*i)?;
            let child = set_inner(existing, rest, value)?;
            let mut next = Vec::clone(items);
            next[*i] = child;
            Some(JsonValue::Array(Arc::new(next)))
        }
        _ => None,
    }
}

/// Build the subtree for a key that does not exist yet. Only object keys can
/// be synthesized; an index below a missing node has nothing to address.
fn synthesize(path: &[Segment], value: JsonValue) -> Option<JsonValue> {
    match path.first() {
        None => Some(value),
        Some(Segment::Key(_)) => set_inner(&JsonValue::empty_object(), path, value),
        Some(Segment::Index(_)) => None,
    }
}

/// Copy of `root` without the node at `path`. Removing from an array shifts
/// later elements down. The empty path and unresolvable paths leave `root`
/// unchanged.
pub fn delete_at(root: &JsonValue, path: &[Segment]) -> JsonValue {
    delete_inner(root, path).unwrap_or_else(|| root.clone())
}

fn delete_inner(node: &JsonValue, path: &[Segment]) -> Option<JsonValue> {
    let (head, rest) = path.split_first()?;
    match (node, head) {
        (JsonValue::Object(map), Segment::Key(key)) => {
            let mut next = JsonMap::clone(map);
            if rest.is_empty() {
                next.shift_remove(key)?;
            } else {
                let child = delete_inner(map.get(key)?, rest)?;
                next.insert(key.clone(), child);
            }
            Some(JsonValue::Object(Arc::new(next)))
        }
        (JsonValue::Array(items), Segment::Index(i)) if *i < items.len() => {
            let mut next = Vec::clone(items);
            if rest.is_empty() {
                next.remove(*i);
            } else {
                next[*i] = delete_inner(&items[*i], rest)?;
            }
            Some(JsonValue::Array(Arc::new(next)))
        }
        _ => None,
    }
}

/// Every path from the root to a scalar leaf, in pre-order (object keys in
/// stored order, array elements by index). Empty containers contribute
/// nothing; a scalar root yields the empty path.
pub fn collect_leaf_paths(value: &JsonValue) -> Vec<JsonPath> {
    let mut out = Vec::new();
    collect_into(value, &JsonPath::root(), &mut out);
    out
}

fn collect_into(value: &JsonValue, prefix: &JsonPath, out: &mut Vec<JsonPath>) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map.iter() {
                collect_into(child, &prefix.child(Segment::Key(key.clone())), out);
            }
        }
        JsonValue::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_into(child, &prefix.child(Segment::Index(i)), out);
            }
        }
        _ => out.push(prefix.clone()),
    }
}

/// Right-biased recursive merge of `overlay` onto `base`.
///
/// Objects merge key by key: keys only in `base` are kept as they are, keys in
/// `overlay` win (recursively when both sides are objects). Any other overlay
/// value, arrays included, replaces the base subtree outright.
pub fn deep_merge(base: &JsonValue, overlay: &JsonValue) -> JsonValue {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            let mut merged = JsonMap::clone(base_map);
            for (key, value) in overlay_map.iter() {
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            JsonValue::Object(Arc::new(merged))
        }
        _ => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: serde_json::Value) -> JsonValue {
        JsonValue::from(value)
    }

    #[test]
    fn get_walks_segments() {
        let doc = v(json!({"a": {"b": [10, {"c": "deep"}]}}));
        let path = JsonPath::root().key("a").key("b").index(1).key("c");
        assert_eq!(get(&doc, &path), Some(&JsonValue::from("deep")));
        assert_eq!(get(&doc, &JsonPath::root()), Some(&doc));
    }

    #[test]
    fn get_absent_cases() {
        let doc = v(json!({"a": {"b": [10]}, "s": "text"}));
        // scalar before path exhausted
        assert_eq!(get(&doc, &JsonPath::root().key("s").key("x")), None);
        // wrong segment kind
        assert_eq!(get(&doc, &JsonPath::root().key("a").index(0)), None);
        // index out of range
        assert_eq!(get(&doc, &JsonPath::root().key("a").key("b").index(1)), None);
        // key absent
        assert_eq!(get(&doc, &JsonPath::root().key("zzz")), None);
    }

    #[test]
    fn set_replaces_leaf_and_shares_siblings() {
        let doc = v(json!({"a": {"b": 1, "c": [1, 2, 3]}, "d": {"e": true}}));
        let out = set(&doc, &JsonPath::root().key("a").key("b"), JsonValue::from(2i64));
        assert_eq!(out, v(json!({"a": {"b": 2, "c": [1, 2, 3]}, "d": {"e": true}})));

        let old_c = get(&doc, &JsonPath::root().key("a").key("c")).unwrap();
        let new_c = get(&out, &JsonPath::root().key("a").key("c")).unwrap();
        assert!(new_c.shares_storage(old_c));
        assert!(out.get_key("d").unwrap().shares_storage(doc.get_key("d").unwrap()));
        // ancestors on the path are fresh copies
        assert!(!out.shares_storage(&doc));
        assert!(!out.get_key("a").unwrap().shares_storage(doc.get_key("a").unwrap()));
    }

    #[test]
    fn set_empty_path_replaces_root() {
        let doc = v(json!({"a": 1}));
        assert_eq!(set(&doc, &JsonPath::root(), JsonValue::from("x")), JsonValue::from("x"));
    }

    #[test]
    fn set_creates_missing_keys_and_intermediate_objects() {
        let doc = v(json!({"a": {}}));
        let out = set(&doc, &JsonPath::root().key("a").key("new"), JsonValue::from(1i64));
        assert_eq!(out, v(json!({"a": {"new": 1}})));

        let out = set(
            &doc,
            &JsonPath::root().key("x").key("y").key("z"),
            JsonValue::Bool(true),
        );
        assert_eq!(out, v(json!({"a": {}, "x": {"y": {"z": true}}})));
    }

    #[test]
    fn set_in_array_element() {
        let doc = v(json!({"list": [{"n": 1}, {"n": 2}]}));
        let out = set(&doc, &JsonPath::root().key("list").index(1).key("n"), JsonValue::from(5i64));
        assert_eq!(out, v(json!({"list": [{"n": 1}, {"n": 5}]})));
        let first_before = get(&doc, &JsonPath::root().key("list").index(0)).unwrap();
        let first_after = get(&out, &JsonPath::root().key("list").index(0)).unwrap();
        assert!(first_after.shares_storage(first_before));
    }

    #[test]
    fn set_degrades_to_no_op() {
        let doc = v(json!({"list": [1, 2], "s": "text", "n": null}));
        // append is not supported
        assert_eq!(set(&doc, &JsonPath::root().key("list").index(2), JsonValue::Null), doc);
        // key under array
        assert_eq!(set(&doc, &JsonPath::root().key("list").key("k"), JsonValue::Null), doc);
        // descend into scalar
        assert_eq!(set(&doc, &JsonPath::root().key("s").key("k"), JsonValue::Null), doc);
        assert_eq!(set(&doc, &JsonPath::root().key("n").key("k"), JsonValue::Null), doc);
        // index below a missing key
        assert_eq!(set(&doc, &JsonPath::root().key("new").index(0), JsonValue::Null), doc);
    }

    #[test]
    fn delete_removes_key_preserving_order() {
        let doc = v(json!({"a": 1, "b": 2, "c": 3}));
        let out = delete_at(&doc, &JsonPath::root().key("b"));
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn delete_shifts_array_elements() {
        let doc = v(json!({"l": ["x", "y", "z"], "o": {"k": 1}}));
        let out = delete_at(&doc, &JsonPath::root().key("l").index(0));
        assert_eq!(out, v(json!({"l": ["y", "z"], "o": {"k": 1}})));
        assert!(out.get_key("o").unwrap().shares_storage(doc.get_key("o").unwrap()));
    }

    #[test]
    fn delete_no_op_cases() {
        let doc = v(json!({"a": {"b": 1}, "l": [1]}));
        assert_eq!(delete_at(&doc, &JsonPath::root()), doc);
        assert!(delete_at(&doc, &JsonPath::root()).shares_storage(&doc));
        assert_eq!(delete_at(&doc, &JsonPath::root().key("missing")), doc);
        assert_eq!(delete_at(&doc, &JsonPath::root().key("l").index(4)), doc);
        assert_eq!(delete_at(&doc, &JsonPath::root().key("a").key("b").key("c")), doc);
    }

    #[test]
    fn leaf_paths_pre_order() {
        let doc = v(json!({"p": {"q": 1, "r": [2, 3]}}));
        let paths: Vec<String> = collect_leaf_paths(&doc).iter().map(|p| p.dotted()).collect();
        assert_eq!(paths, vec!["p.q", "p.r.0", "p.r.1"]);
    }

    #[test]
    fn leaf_paths_skip_empty_containers() {
        let doc = v(json!({"e": {}, "l": [], "n": null, "nested": [[], [{}], [true]]}));
        let paths: Vec<String> = collect_leaf_paths(&doc).iter().map(|p| p.dotted()).collect();
        assert_eq!(paths, vec!["n", "nested.2.0"]);
    }

    #[test]
    fn leaf_paths_scalar_root() {
        let paths = collect_leaf_paths(&JsonValue::from(7i64));
        assert_eq!(paths, vec![JsonPath::root()]);
    }

    #[test]
    fn merge_scenario() {
        let base = v(json!({"x": 1, "y": {"z": 2}}));
        let overlay = v(json!({"y": {"z": 5, "w": 9}}));
        assert_eq!(deep_merge(&base, &overlay), v(json!({"x": 1, "y": {"z": 5, "w": 9}})));
    }

    #[test]
    fn merge_arrays_replace_outright() {
        let base = v(json!({"bounds": [1, 2, 3], "keep": [4]}));
        let overlay = v(json!({"bounds": [9]}));
        let out = deep_merge(&base, &overlay);
        assert_eq!(out, v(json!({"bounds": [9], "keep": [4]})));
        assert!(out.get_key("keep").unwrap().shares_storage(base.get_key("keep").unwrap()));
    }

    #[test]
    fn merge_type_mismatch_overlay_wins() {
        let base = v(json!({"a": 5, "b": {"c": 1}}));
        let overlay = v(json!({"a": {"nested": true}, "b": "flat"}));
        assert_eq!(deep_merge(&base, &overlay), v(json!({"a": {"nested": true}, "b": "flat"})));
        assert_eq!(deep_merge(&JsonValue::Null, &overlay), overlay);
    }

    #[test]
    fn merge_onto_self_is_identity() {
        let doc = v(json!({"a": {"b": [1, {"c": null}]}, "d": "s"}));
        assert_eq!(deep_merge(&doc, &doc), doc);
    }
}
