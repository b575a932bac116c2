// Copyright 2025 The Collab Doc Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The patch algebra: `apply`, `invert`, `overlap`, `squash` over the
//! four-verb patch operations defined in §4.B/§4.G.
//!
//! A production deployment could swap this module for a shared JSON Patch
//! library behind the same four signatures; the rest of the crate only ever
//! calls through them.

use itertools::Itertools as _;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::HistoryError;
use crate::error::HistoryResult;
use crate::path::Path;
use crate::path::path;

/// The verb of a single patch operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Force-set the node at `path` to `value`.
    Update,
    /// Remove the node at `path`.
    Delete,
    /// Prepend to a list, or force-set a scalar.
    Add,
    /// Remove a value from a list, or delete a scalar node.
    Remove,
}

/// A single patch operation, as carried on the wire: a raw path string plus
/// an optional value. `path()` and [`validate_op`] are what promote this
/// into something the rest of the crate trusts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    /// What kind of edit this operation performs.
    pub op: OpKind,
    /// Raw JSON-Pointer-shaped path, validated by [`path`] before use.
    pub path: String,
    /// The operand. `Delete` carries none; every other verb requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    /// Constructs an `update` operation.
    pub fn update(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: OpKind::Update,
            path: path.into(),
            value: Some(value),
        }
    }

    /// Constructs a `delete` operation.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            op: OpKind::Delete,
            path: path.into(),
            value: None,
        }
    }

    /// Constructs an `add` operation.
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: OpKind::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    /// Constructs a `remove` operation.
    pub fn remove(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: OpKind::Remove,
            path: path.into(),
            value: Some(value),
        }
    }

    fn parsed_path(&self) -> HistoryResult<Path> {
        path(&self.path)
    }
}

/// An ordered sequence of operations. The empty patch is a no-op.
pub type Patch = Vec<PatchOp>;

/// Validates a single operation: its path must parse, and `value` must be
/// present except for `delete`, where it must be absent.
pub fn validate_op(op: &PatchOp) -> HistoryResult<()> {
    op.parsed_path()
        .map_err(|_| HistoryError::validation("PatchOp", "path", "a valid JSON pointer", &op.path))?;
    match (op.op, &op.value) {
        (OpKind::Delete, Some(_)) => Err(HistoryError::validation(
            "PatchOp",
            "value",
            "absent for delete",
            "present",
        )),
        (OpKind::Delete, None) => Ok(()),
        (_, Some(_)) => Ok(()),
        (_, None) => Err(HistoryError::validation(
            "PatchOp",
            "value",
            "present",
            "absent",
        )),
    }
}

/// The `json_patch(p)` validator from §4.A: a patch is valid iff every one
/// of its operations is.
pub fn json_patch(patch: &Patch) -> HistoryResult<()> {
    patch.iter().try_for_each(validate_op)
}

/// The paths touched by a patch, in operation order (not deduplicated).
fn touched_paths(patch: &Patch) -> HistoryResult<Vec<Path>> {
    patch.iter().map(PatchOp::parsed_path).collect()
}

/// True iff `a` and `b` mutate any common or nested path.
pub fn overlap(a: &Patch, b: &Patch) -> HistoryResult<bool> {
    let a_paths = touched_paths(a)?;
    let b_paths = touched_paths(b)?;
    Ok(a_paths
        .iter()
        .cartesian_product(&b_paths)
        .any(|(a, b)| a.overlaps(b)))
}

/// The exact set of paths a patch touches, for the autosquash "same paths"
/// policy (§4.D), which this implementation fixes as set equality.
pub fn path_set_matches(a: &Patch, b: &Patch) -> HistoryResult<bool> {
    let mut a_paths = touched_paths(a)?;
    let mut b_paths = touched_paths(b)?;
    a_paths.sort_by_key(ToString::to_string);
    a_paths.dedup();
    b_paths.sort_by_key(ToString::to_string);
    b_paths.dedup();
    Ok(a_paths == b_paths)
}

/// Forward composition: applying `squash(a, b)` is equivalent to applying
/// `a` then `b`. Sequencing (plain concatenation), not simplification, is
/// what makes that hold unconditionally.
pub fn squash(a: &Patch, b: &Patch) -> Patch {
    a.iter().cloned().chain(b.iter().cloned()).collect()
}

/// Applies a single operation to `value` in place, per §4.G:
/// - `update`: force-set, creating intermediate containers as needed.
/// - `delete`: remove the node; absent path is a no-op.
/// - `add`: prepend if the existing node is a list, else force-set.
/// - `remove`: drop the first matching element if the node is a list, delete
///   a scalar node, or no-op if the path is absent.
pub fn apply_op(value: &mut Value, op: &PatchOp) -> HistoryResult<()> {
    let path = op.parsed_path()?;
    match op.op {
        OpKind::Update => {
            let operand = op.value.clone().expect("validated: update carries a value");
            force_set(value, path.segments(), operand);
        }
        OpKind::Delete => {
            remove_node(value, path.segments());
        }
        OpKind::Add => {
            let operand = op.value.clone().expect("validated: add carries a value");
            match node_at_mut(value, path.segments()) {
                Some(Value::Array(list)) => list.insert(0, operand),
                _ => force_set(value, path.segments(), operand),
            }
        }
        OpKind::Remove => {
            let operand = op.value.as_ref().expect("validated: remove carries a value");
            match node_at_mut(value, path.segments()) {
                Some(Value::Array(list)) => {
                    if let Some(index) = list.iter().position(|item| item == operand) {
                        list.remove(index);
                    }
                }
                Some(_) => remove_node(value, path.segments()),
                None => {}
            }
        }
    }
    Ok(())
}

/// Applies every operation in `patch` left to right.
pub fn apply_patch(value: &Value, patch: &Patch) -> HistoryResult<Value> {
    let mut value = value.clone();
    for op in patch {
        apply_op(&mut value, op)?;
    }
    Ok(value)
}

/// Computes the patch that undoes `patch` against `before`, the document
/// state just prior to applying it. Walks operations forward against a
/// scratch copy so each inverse is built from the value it actually
/// replaced, then emits the inverses in reverse order: undoing `p1` then
/// `p2` requires undoing `p2` first.
pub fn invert_patch(before: &Value, patch: &Patch) -> HistoryResult<Patch> {
    let mut scratch = before.clone();
    let mut inverses = Vec::with_capacity(patch.len());
    for op in patch {
        let path_str = op.path.clone();
        let segments = op.parsed_path()?;
        let previous = node_at_mut(&mut scratch, segments.segments()).cloned();
        let inverse = match op.op {
            OpKind::Update => match previous {
                Some(old) => PatchOp::update(path_str.clone(), old),
                None => PatchOp::delete(path_str.clone()),
            },
            OpKind::Delete => match previous {
                Some(old) => PatchOp::update(path_str.clone(), old),
                None => PatchOp::delete(path_str.clone()),
            },
            OpKind::Add => match previous {
                Some(Value::Array(_)) => {
                    let operand = op.value.clone().expect("validated: add carries a value");
                    PatchOp::remove(path_str.clone(), operand)
                }
                Some(old) => PatchOp::update(path_str.clone(), old),
                None => PatchOp::delete(path_str.clone()),
            },
            // `add` only prepends, so it can't restore an element removed
            // from the middle of a list at its original position; `update`
            // with the full prior value puts it back exactly as it was.
            OpKind::Remove => match previous {
                Some(old) => PatchOp::update(path_str.clone(), old),
                None => PatchOp::delete(path_str.clone()),
            },
        };
        inverses.push(inverse);
        apply_op(&mut scratch, op)?;
    }
    inverses.reverse();
    Ok(inverses)
}

fn node_at_mut<'v>(value: &'v mut Value, segments: &[crate::path::PathSegment]) -> Option<&'v mut Value> {
    use crate::path::PathSegment;
    let mut current = value;
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (PathSegment::Index(index), Value::Array(list)) => list.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

fn remove_node(value: &mut Value, segments: &[crate::path::PathSegment]) {
    use crate::path::PathSegment;
    let Some((last, parent_segments)) = segments.split_last() else {
        return;
    };
    let Some(parent) = node_at_mut(value, parent_segments) else {
        return;
    };
    match (last, parent) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.remove(key);
        }
        (PathSegment::Index(index), Value::Array(list)) if *index < list.len() => {
            list.remove(*index);
        }
        _ => {}
    }
}

fn force_set(value: &mut Value, segments: &[crate::path::PathSegment], operand: Value) {
    use crate::path::PathSegment;
    let Some((last, parent_segments)) = segments.split_last() else {
        *value = operand;
        return;
    };
    let mut current = value;
    for segment in parent_segments {
        let key_is_index = matches!(segment, PathSegment::Index(_));
        let wrong_container = !matches!(
            (segment, &*current),
            (PathSegment::Key(_), Value::Object(_)) | (PathSegment::Index(_), Value::Array(_))
        );
        if wrong_container {
            *current = if key_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(serde_json::Map::new())
            };
        }
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => {
                map.entry(key.clone()).or_insert(Value::Null)
            }
            (PathSegment::Index(index), Value::Array(list)) => {
                while list.len() <= *index {
                    list.push(Value::Null);
                }
                &mut list[*index]
            }
            _ => unreachable!("container coerced above"),
        };
    }
    match (last, current) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), operand);
        }
        (PathSegment::Key(key), slot) => {
            let mut map = serde_json::Map::new();
            map.insert(key.clone(), operand);
            *slot = Value::Object(map);
        }
        (PathSegment::Index(index), Value::Array(list)) => {
            while list.len() <= *index {
                list.push(Value::Null);
            }
            list[*index] = operand;
        }
        (PathSegment::Index(index), slot) => {
            let mut list = Vec::new();
            while list.len() <= *index {
                list.push(Value::Null);
            }
            list[*index] = operand;
            *slot = Value::Array(list);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn update_forces_intermediate_containers() {
        let mut value = json!({});
        apply_op(&mut value, &PatchOp::update("/a/b", json!(1))).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn delete_missing_path_is_noop() {
        let mut value = json!({"a": 1});
        apply_op(&mut value, &PatchOp::delete("/missing")).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn add_prepends_to_list() {
        let mut value = json!({"a": [1, 2]});
        apply_op(&mut value, &PatchOp::add("/a", json!(0))).unwrap();
        assert_eq!(value, json!({"a": [0, 1, 2]}));
    }

    #[test]
    fn add_force_sets_non_list() {
        let mut value = json!({});
        apply_op(&mut value, &PatchOp::add("/a", json!(1))).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn remove_drops_first_match_from_list() {
        let mut value = json!({"a": [1, 2, 1]});
        apply_op(&mut value, &PatchOp::remove("/a", json!(1))).unwrap();
        assert_eq!(value, json!({"a": [2, 1]}));
    }

    #[test]
    fn remove_scalar_deletes_node() {
        let mut value = json!({"a": 1});
        apply_op(&mut value, &PatchOp::remove("/a", json!(1))).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn squash_identity_forward() {
        let v = json!({});
        let p1 = vec![PatchOp::add("/a", json!(1))];
        let p2 = vec![PatchOp::update("/a", json!(2))];
        let composed = squash(&p1, &p2);
        let sequential = apply_patch(&apply_patch(&v, &p1).unwrap(), &p2).unwrap();
        assert_eq!(apply_patch(&v, &composed).unwrap(), sequential);
    }

    #[test]
    fn invert_undoes_update() {
        let before = json!({"a": 1});
        let patch = vec![PatchOp::update("/a", json!(2))];
        let after = apply_patch(&before, &patch).unwrap();
        let inverse = invert_patch(&before, &patch).unwrap();
        assert_eq!(apply_patch(&after, &inverse).unwrap(), before);
    }

    #[test]
    fn invert_undoes_add_to_list() {
        let before = json!({"a": [1]});
        let patch = vec![PatchOp::add("/a", json!(0))];
        let after = apply_patch(&before, &patch).unwrap();
        let inverse = invert_patch(&before, &patch).unwrap();
        assert_eq!(apply_patch(&after, &inverse).unwrap(), before);
    }

    #[test]
    fn overlap_detects_ancestor_paths() {
        let a = vec![PatchOp::update("/a", json!(1))];
        let b = vec![PatchOp::update("/a/b", json!(2))];
        assert!(overlap(&a, &b).unwrap());
    }

    #[test]
    fn overlap_false_for_disjoint_paths() {
        let a = vec![PatchOp::update("/a", json!(1))];
        let b = vec![PatchOp::update("/b", json!(2))];
        assert!(!overlap(&a, &b).unwrap());
    }

    #[test]
    fn update_coerces_existing_array_into_object_along_the_path() {
        let mut value = json!({"a": [1, 2, 3]});
        apply_op(&mut value, &PatchOp::update("/a/b/c", json!(5))).unwrap();
        assert_eq!(value, json!({"a": {"b": {"c": 5}}}));
    }

    #[test]
    fn update_coerces_existing_object_into_array_along_the_path() {
        let mut value = json!({"a": {"b": 1}});
        apply_op(&mut value, &PatchOp::update("/a/0", json!(5))).unwrap();
        assert_eq!(value, json!({"a": [5]}));
    }

    #[test]
    fn invert_restores_list_element_to_its_original_position() {
        let before = json!({"a": [1, 2, 3]});
        let patch = vec![PatchOp::remove("/a", json!(2))];
        let after = apply_patch(&before, &patch).unwrap();
        assert_eq!(after, json!({"a": [1, 3]}));
        let inverse = invert_patch(&before, &patch).unwrap();
        assert_eq!(apply_patch(&after, &inverse).unwrap(), before);
    }
}
