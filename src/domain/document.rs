// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration documents and deep merging.
//!
//! A document is a JSON object. Documents from every source are combined with
//! [`deep_merge`], in which mappings merge key by key and every other value is
//! replaced by the higher-precedence operand.

use crate::domain::KeyPath;
use serde_json::{Map, Value};

/// A configuration document: a JSON object at the top level.
pub type Document = Map<String, Value>;

/// Deep merges `overlay` onto `base`, with `overlay` taking precedence.
///
/// - Objects are merged recursively: keys only present on one side are kept
/// - Anything else (scalars, arrays, `null`) in `overlay` replaces `base` outright
///
/// # Examples
///
/// ```
/// use layercfg::domain::document::deep_merge;
/// use serde_json::json;
///
/// let base = json!({"a": {"x": 1, "y": 2}, "list": [1, 2]});
/// let overlay = json!({"a": {"y": 3}, "list": [3]});
///
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"a": {"x": 1, "y": 3}, "list": [3]})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_documents(base_map, overlay_map))
        }
        (_, overlay) => overlay,
    }
}

/// Deep merges two documents, with `overlay` taking precedence.
pub fn merge_documents(mut base: Document, overlay: Document) -> Document {
    for (key, overlay_value) in overlay {
        let merged = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged);
    }
    base
}

/// Merges documents in order, later documents taking precedence.
///
/// The fold starts from an empty document, so an empty input yields `{}`.
pub fn deep_merge_all(documents: impl IntoIterator<Item = Document>) -> Document {
    documents
        .into_iter()
        .fold(Document::new(), merge_documents)
}

/// Looks up the value at `path`, descending through objects and arrays.
///
/// Numeric segments index into arrays. The root path returns `root` itself.
pub fn lookup<'a>(root: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Why a value could not be placed at a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    /// The already occupied path that blocked the insertion
    pub occupied: KeyPath,
}

/// Places `value` at `path`, creating intermediate objects as needed.
///
/// Insertion never overwrites: if a scalar already sits on the way to `path`,
/// or anything already sits at `path` itself, a [`PathConflict`] naming the
/// occupied path is returned and the document is left unchanged.
///
/// # Examples
///
/// ```
/// use layercfg::domain::document::{insert_at_path, Document};
/// use layercfg::domain::KeyPath;
/// use serde_json::json;
///
/// let mut doc = Document::new();
/// insert_at_path(&mut doc, &KeyPath::from("db.host"), json!("localhost")).unwrap();
/// insert_at_path(&mut doc, &KeyPath::from("db.port"), json!(5432)).unwrap();
///
/// assert!(insert_at_path(&mut doc, &KeyPath::from("db"), json!(true)).is_err());
/// assert_eq!(
///     serde_json::Value::Object(doc),
///     json!({"db": {"host": "localhost", "port": 5432}})
/// );
/// ```
pub fn insert_at_path(
    doc: &mut Document,
    path: &KeyPath,
    value: Value,
) -> std::result::Result<(), PathConflict> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Err(PathConflict {
            occupied: KeyPath::default(),
        });
    };

    // Check the whole route first so a failed insert leaves no empty objects behind.
    let mut probe = Some(&*doc);
    for (depth, segment) in segments.iter().enumerate() {
        let Some(map) = probe else { break };
        probe = match map.get(segment) {
            None => None,
            Some(Value::Object(child)) if depth < parents.len() => Some(child),
            Some(_) => {
                return Err(PathConflict {
                    occupied: path.prefix(depth + 1),
                })
            }
        };
    }

    let mut current = doc;
    for (depth, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Document::new()));
        current = match entry {
            Value::Object(child) => child,
            _ => {
                return Err(PathConflict {
                    occupied: path.prefix(depth + 1),
                })
            }
        };
    }
    current.insert(last.clone(), value);
    Ok(())
}
