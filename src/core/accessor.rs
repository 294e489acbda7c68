//! Purpose: The get/set capability the assign, pluck and accumulate helpers delegate to.
//! Exports: `PathAccessor`, `JsonAccessor`.
//! Role: Only place that knows how a path descriptor walks a concrete container model.
//! Invariants: `get` never fails; missing levels and scalar intermediates read as ABSENT (`None`).
//! Invariants: `set` creates missing intermediates and never silently skips a write.
//! Invariants: Array padding per write is bounded by `MAX_INDEX_GAP`.

use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::path::{PathDescriptor, Segment};

/// Largest number of `null`s a single write may pad onto an array.
pub const MAX_INDEX_GAP: usize = 1 << 16;

/// Two-operation contract over a container type.
///
/// ABSENT is modelled as `None`, distinct from any value the container can
/// store. Passing `None` to `set` writes ABSENT at the location.
pub trait PathAccessor {
    type Container;
    type Value;

    fn get(&self, container: &Self::Container, path: &PathDescriptor) -> Option<Self::Value>;

    fn set(
        &self,
        container: &mut Self::Container,
        path: &PathDescriptor,
        value: Option<Self::Value>,
    ) -> Result<(), Error>;
}

impl<T: PathAccessor + ?Sized> PathAccessor for &T {
    type Container = T::Container;
    type Value = T::Value;

    fn get(&self, container: &Self::Container, path: &PathDescriptor) -> Option<Self::Value> {
        (**self).get(container, path)
    }

    fn set(
        &self,
        container: &mut Self::Container,
        path: &PathDescriptor,
        value: Option<Self::Value>,
    ) -> Result<(), Error> {
        (**self).set(container, path, value)
    }
}

/// `PathAccessor` over `serde_json::Value` trees.
///
/// Index segments address array elements, or the decimal key on objects.
/// Writing ABSENT removes an object entry; on arrays it stores `null` so
/// later indices do not shift.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAccessor;

impl JsonAccessor {
    /// Borrowing variant of `get`.
    pub fn lookup<'a>(&self, container: &'a Value, path: &PathDescriptor) -> Option<&'a Value> {
        path.segments()
            .iter()
            .try_fold(container, |current, segment| match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => map.get(key.as_str()),
                (Value::Object(map), Segment::Index(index)) => map.get(index.to_string().as_str()),
                (Value::Array(items), Segment::Index(index)) => items.get(*index),
                _ => None,
            })
    }
}

impl PathAccessor for JsonAccessor {
    type Container = Value;
    type Value = Value;

    fn get(&self, container: &Value, path: &PathDescriptor) -> Option<Value> {
        self.lookup(container, path).cloned()
    }

    fn set(
        &self,
        container: &mut Value,
        path: &PathDescriptor,
        value: Option<Value>,
    ) -> Result<(), Error> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("cannot assign to the root of a container")
                .with_path(path.to_string())
                .with_hint("Target paths need at least one key or index."));
        };

        if container.is_null() {
            *container = empty_container_for(&segments[0]);
        }

        let mut current = container;
        for (pos, segment) in parents.iter().enumerate() {
            current = descend(current, segment, &segments[pos + 1], path)?;
        }
        assign_leaf(current, last, value, path)
    }
}

fn descend<'a>(
    current: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    path: &PathDescriptor,
) -> Result<&'a mut Value, Error> {
    let slot = slot_mut(current, segment, path)?;
    if slot.is_null() {
        *slot = empty_container_for(next);
    }
    if slot.is_object() || slot.is_array() {
        Ok(slot)
    } else {
        Err(not_container(path, next, type_name(slot)))
    }
}

fn slot_mut<'a>(
    current: &'a mut Value,
    segment: &Segment,
    path: &PathDescriptor,
) -> Result<&'a mut Value, Error> {
    match current {
        Value::Object(map) => Ok(map.entry(segment.as_key()).or_insert(Value::Null)),
        Value::Array(items) => match segment {
            Segment::Index(index) => element_mut(items, *index, path),
            Segment::Key(_) => Err(not_container(path, segment, "array")),
        },
        other => Err(not_container(path, segment, type_name(other))),
    }
}

fn assign_leaf(
    current: &mut Value,
    last: &Segment,
    value: Option<Value>,
    path: &PathDescriptor,
) -> Result<(), Error> {
    match current {
        Value::Object(map) => match value {
            Some(value) => {
                map.insert(last.as_key(), value);
            }
            None => {
                map.remove(last.as_key().as_str());
            }
        },
        Value::Array(items) => match last {
            Segment::Index(index) => {
                *element_mut(items, *index, path)? = value.unwrap_or(Value::Null);
            }
            Segment::Key(_) => return Err(not_container(path, last, "array")),
        },
        other => return Err(not_container(path, last, type_name(other))),
    }
    Ok(())
}

fn element_mut<'a>(
    items: &'a mut Vec<Value>,
    index: usize,
    path: &PathDescriptor,
) -> Result<&'a mut Value, Error> {
    let len = items.len();
    if index >= len {
        let gap = index - len;
        let new_len = index
            .checked_add(1)
            .filter(|_| gap <= MAX_INDEX_GAP)
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!(
                        "index {index} is too far past the end of an array of length {len}"
                    ))
                    .with_path(path.to_string())
                    .with_hint(format!(
                        "Writes may pad an array with at most {MAX_INDEX_GAP} nulls."
                    ))
            })?;
        items.resize(new_len, Value::Null);
    }
    Ok(&mut items[index])
}

fn empty_container_for(next: &Segment) -> Value {
    match next {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn not_container(path: &PathDescriptor, segment: &Segment, found: &str) -> Error {
    Error::new(ErrorKind::NotContainer)
        .with_message(format!("cannot address `{segment}` inside a {found}"))
        .with_path(path.to_string())
        .with_hint("Every value along a target path must be an object, or an array for index segments.")
}

#[cfg(test)]
mod tests {
    use super::{JsonAccessor, MAX_INDEX_GAP, PathAccessor};
    use crate::core::error::ErrorKind;
    use crate::core::path::{PathDescriptor, Segment};
    use serde_json::{json, Value};

    fn path(text: &str) -> PathDescriptor {
        PathDescriptor::parse(text).expect("path")
    }

    #[test]
    fn get_reads_nested_values() {
        let doc = json!({"a": {"b": [10, {"c": "deep"}]}});
        let accessor = JsonAccessor;
        assert_eq!(accessor.get(&doc, &path("a.b.0")), Some(json!(10)));
        assert_eq!(accessor.get(&doc, &path("a.b[1].c")), Some(json!("deep")));
        assert_eq!(accessor.get(&doc, &path("")), Some(doc.clone()));
    }

    #[test]
    fn get_missing_levels_is_absent() {
        let doc = json!({"a": {"b": 5}, "list": [1]});
        let accessor = JsonAccessor;
        assert_eq!(accessor.get(&doc, &path("x.y.z")), None);
        assert_eq!(accessor.get(&doc, &path("a.b.c")), None);
        assert_eq!(accessor.get(&doc, &path("list.5")), None);
        assert_eq!(accessor.get(&doc, &path("list.key")), None);
    }

    #[test]
    fn stored_null_is_not_absent() {
        let doc = json!({"a": null});
        assert_eq!(JsonAccessor.get(&doc, &path("a")), Some(Value::Null));
        assert_eq!(JsonAccessor.get(&doc, &path("b")), None);
    }

    #[test]
    fn index_segment_reads_numeric_object_key() {
        let doc = json!({"m": {"0": "zero"}});
        assert_eq!(JsonAccessor.get(&doc, &path("m.0")), Some(json!("zero")));
    }

    #[test]
    fn set_creates_objects_and_arrays() {
        let mut doc = json!({});
        JsonAccessor
            .set(&mut doc, &path("a.b"), Some(json!(42)))
            .expect("set");
        JsonAccessor
            .set(&mut doc, &path("list.2.name"), Some(json!("x")))
            .expect("set");
        assert_eq!(
            doc,
            json!({"a": {"b": 42}, "list": [null, null, {"name": "x"}]})
        );
    }

    #[test]
    fn set_overwrites_and_keeps_siblings() {
        let mut doc = json!({"a": {"b": 1, "keep": true}});
        JsonAccessor
            .set(&mut doc, &path("a.b"), Some(json!([1, 2])))
            .expect("set");
        assert_eq!(doc, json!({"a": {"b": [1, 2], "keep": true}}));
    }

    #[test]
    fn set_replaces_null_intermediates_and_root() {
        let mut doc = json!({"a": null});
        JsonAccessor
            .set(&mut doc, &path("a.b"), Some(json!(1)))
            .expect("set");
        assert_eq!(doc, json!({"a": {"b": 1}}));

        let mut root = Value::Null;
        JsonAccessor
            .set(&mut root, &path("[1]"), Some(json!("v")))
            .expect("set");
        assert_eq!(root, json!([null, "v"]));
    }

    #[test]
    fn set_through_scalar_is_not_container() {
        let mut doc = json!({"a": 5});
        let err = JsonAccessor
            .set(&mut doc, &path("a.b"), Some(json!(1)))
            .expect_err("scalar intermediate");
        assert_eq!(err.kind(), ErrorKind::NotContainer);
        assert_eq!(err.path(), Some("a.b"));
        assert_eq!(doc, json!({"a": 5}));

        let mut list = json!({"l": []});
        let err = JsonAccessor
            .set(&mut list, &path("l.name"), Some(json!(1)))
            .expect_err("key on array");
        assert_eq!(err.kind(), ErrorKind::NotContainer);
    }

    #[test]
    fn set_root_is_usage_error() {
        let mut doc = json!({});
        let err = JsonAccessor
            .set(&mut doc, &PathDescriptor::root(), Some(json!(1)))
            .expect_err("root");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn absent_removes_object_entry_but_creates_parents() {
        let mut doc = json!({"a": {"b": 1, "c": 2}});
        JsonAccessor.set(&mut doc, &path("a.b"), None).expect("set");
        assert_eq!(doc, json!({"a": {"c": 2}}));

        let mut fresh = json!({});
        JsonAccessor.set(&mut fresh, &path("x.y"), None).expect("set");
        assert_eq!(fresh, json!({"x": {}}));
        assert_eq!(JsonAccessor.get(&fresh, &path("x.y")), None);
    }

    #[test]
    fn huge_indices_are_rejected_without_growing() {
        for text in ["a.18446744073709551615", "a.99999999999", "a[99999999999].b"] {
            let mut doc = json!({"a": [1, 2]});
            let err = JsonAccessor
                .set(&mut doc, &path(text), Some(json!(1)))
                .expect_err(text);
            assert_eq!(err.kind(), ErrorKind::Usage, "{text}");
            assert_eq!(err.path(), Some(path(text).to_string().as_str()));
            assert_eq!(doc, json!({"a": [1, 2]}), "{text}");
        }
    }

    #[test]
    fn padding_up_to_the_gap_limit_is_allowed() {
        let mut doc = json!([]);
        let index = MAX_INDEX_GAP;
        JsonAccessor
            .set(&mut doc, &PathDescriptor::from(vec![Segment::Index(index)]), Some(json!(1)))
            .expect("set at limit");
        let items = doc.as_array().expect("array");
        assert_eq!(items.len(), index + 1);
        assert_eq!(items[index], json!(1));
    }

    #[test]
    fn absent_in_array_collapses_to_null() {
        let mut doc = json!({"l": [1, 2, 3]});
        JsonAccessor.set(&mut doc, &path("l.1"), None).expect("set");
        assert_eq!(doc, json!({"l": [1, null, 3]}));
    }
}
