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

//! §4.G's four operation semantics, exercised through whole commit chains
//! rather than single operations (which `patch.rs`'s own unit tests cover).

use doc_history_core::fold_chain;
use doc_history_core::PatchOp;
use pretty_assertions::assert_eq;
use serde_json::json;
use testutils::CommitBuilder;

#[test]
fn delete_of_absent_path_is_a_noop_across_a_chain() {
    let root = CommitBuilder::root()
        .patch(vec![PatchOp::add("/a", json!(1))])
        .build();
    let child = CommitBuilder::child_of(&root)
        .patch(vec![PatchOp::delete("/never-existed")])
        .build();
    let result = fold_chain(&json!({}), &[root, child]).unwrap();
    assert_eq!(result, json!({"a": 1}));
}

#[test]
fn add_prepends_repeatedly_to_a_list() {
    let root = CommitBuilder::root()
        .patch(vec![PatchOp::update("/items", json!([]))])
        .build();
    let child = CommitBuilder::child_of(&root)
        .patch(vec![PatchOp::add("/items", json!("first"))])
        .build();
    let grandchild = CommitBuilder::child_of(&child)
        .patch(vec![PatchOp::add("/items", json!("second"))])
        .build();
    let result = fold_chain(&json!({}), &[root, child, grandchild]).unwrap();
    assert_eq!(result, json!({"items": ["second", "first"]}));
}

#[test]
fn remove_drops_first_matching_list_element_only() {
    let root = CommitBuilder::root()
        .patch(vec![PatchOp::update("/items", json!([1, 2, 1, 3]))])
        .build();
    let child = CommitBuilder::child_of(&root)
        .patch(vec![PatchOp::remove("/items", json!(1))])
        .build();
    let result = fold_chain(&json!({}), &[root, child]).unwrap();
    assert_eq!(result, json!({"items": [2, 1, 3]}));
}

#[test]
fn remove_on_scalar_deletes_the_node() {
    let root = CommitBuilder::root()
        .patch(vec![PatchOp::update("/flag", json!(true))])
        .build();
    let child = CommitBuilder::child_of(&root)
        .patch(vec![PatchOp::remove("/flag", json!(true))])
        .build();
    let result = fold_chain(&json!({}), &[root, child]).unwrap();
    assert_eq!(result, json!({}));
}

#[test]
fn update_creates_intermediate_containers() {
    let root = CommitBuilder::root()
        .patch(vec![PatchOp::update("/a/b/c", json!(42))])
        .build();
    let result = fold_chain(&json!({}), &[root]).unwrap();
    assert_eq!(result, json!({"a": {"b": {"c": 42}}}));
}
