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

//! Fixtures and builders shared across `doc-history-core`'s unit and
//! integration test suites (§4.J). Kept in its own crate, mirroring the
//! dev-dependency split used throughout this codebase, so these helpers
//! never ship in the published library.

use std::collections::HashSet;

use doc_history_core::Commit;
use doc_history_core::CommitId;
use doc_history_core::DocumentId;
use doc_history_core::MemoryHistoryStore;
use doc_history_core::OpKind;
use doc_history_core::Patch;
use doc_history_core::Settings;
use serde_json::Value;
use serde_json::json;
use uuid::Uuid;

/// Builds valid [`Commit`] values for tests without requiring callers to
/// juggle UUID generation or timestamp plumbing themselves.
pub struct CommitBuilder {
    id: CommitId,
    previous_commit_id: Option<CommitId>,
    document_id: DocumentId,
    autosquash: bool,
    patch: Patch,
    meta: Value,
}

impl CommitBuilder {
    /// Starts a fresh document's root commit: a new random `document_id`,
    /// no `previous_commit_id`, and an empty patch.
    pub fn root() -> Self {
        Self {
            id: CommitId::from_uuid(Uuid::new_v4()),
            previous_commit_id: None,
            document_id: DocumentId::from_uuid(Uuid::new_v4()),
            autosquash: false,
            patch: Vec::new(),
            meta: json!(null),
        }
    }

    /// Starts a commit chained onto `parent`, inheriting its `document_id`.
    pub fn child_of(parent: &Commit) -> Self {
        Self {
            id: CommitId::from_uuid(Uuid::new_v4()),
            previous_commit_id: Some(parent.id),
            document_id: parent.document_id,
            autosquash: false,
            patch: Vec::new(),
            meta: json!(null),
        }
    }

    /// Overrides the `document_id` (for constructing intentionally
    /// malformed fixtures, e.g. a stray root in an already-populated
    /// document).
    pub fn document(mut self, document_id: DocumentId) -> Self {
        self.document_id = document_id;
        self
    }

    /// Sets the forward patch.
    pub fn patch(mut self, patch: Patch) -> Self {
        self.patch = patch;
        self
    }

    /// Sets the `autosquash` flag.
    pub fn autosquash(mut self, autosquash: bool) -> Self {
        self.autosquash = autosquash;
        self
    }

    /// Sets the opaque `meta` value.
    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    /// Builds the commit. `reverse_patch` is left empty here — the store
    /// computes it at write time — and `updated_at` is pinned to the Unix
    /// epoch, since tests compare everything but timestamps.
    pub fn build(self) -> Commit {
        Commit {
            id: self.id,
            previous_commit_id: self.previous_commit_id,
            document_id: self.document_id,
            order: 0,
            autosquash: self.autosquash,
            patch: self.patch,
            reverse_patch: Vec::new(),
            meta: self.meta,
            updated_at: chrono::DateTime::UNIX_EPOCH,
        }
    }
}

/// A [`MemoryHistoryStore`] wired up with default [`Settings`], for tests
/// that don't need to vary the autosquash/pagination/logging knobs.
pub fn memory_store() -> MemoryHistoryStore {
    MemoryHistoryStore::new(Settings::default())
}

/// Asserts that `chain` (in any order) satisfies the §3 chain invariants:
/// exactly one root, dense/strictly-increasing `order` from root to tip,
/// and no two commits sharing a `previous_commit_id`.
///
/// Panics with a descriptive message on the first violated invariant,
/// mirroring the style of an ordinary test assertion.
pub fn assert_chain_invariants(chain: &[Commit]) {
    if chain.is_empty() {
        return;
    }
    let roots: Vec<&Commit> = chain
        .iter()
        .filter(|c| c.previous_commit_id.is_none())
        .collect();
    assert_eq!(roots.len(), 1, "expected exactly one chain root");

    let mut parents = HashSet::new();
    for commit in chain {
        if let Some(parent) = commit.previous_commit_id {
            assert!(
                parents.insert(parent),
                "commit {parent} has more than one child"
            );
        }
    }

    let mut by_order: Vec<&Commit> = chain.iter().collect();
    by_order.sort_by_key(|c| c.order);
    for (index, commit) in by_order.iter().enumerate() {
        assert_eq!(
            commit.order, index as u64,
            "order is not dense and strictly increasing"
        );
    }

    let root = roots[0];
    let mut seen = HashSet::new();
    let mut current = root.id;
    seen.insert(current);
    loop {
        let Some(child) = chain.iter().find(|c| c.previous_commit_id == Some(current)) else {
            break;
        };
        assert!(
            seen.insert(child.id),
            "cycle detected while walking chain from root"
        );
        current = child.id;
    }
    assert_eq!(seen.len(), chain.len(), "chain is not fully connected from root");
}

/// Asserts every operation in `patch` carries a well-formed [`OpKind`] and
/// path — a lighter-weight check than full `json_patch` validation, handy
/// for asserting fixtures built by hand are sane before use.
pub fn assert_patch_well_formed(patch: &Patch) {
    for op in patch {
        match op.op {
            OpKind::Delete => assert!(op.value.is_none(), "delete must not carry a value"),
            OpKind::Update | OpKind::Add | OpKind::Remove => {
                assert!(op.value.is_some(), "{:?} must carry a value", op.op);
            }
        }
        assert!(op.path.is_empty() || op.path.starts_with('/'), "malformed path: {}", op.path);
    }
}
