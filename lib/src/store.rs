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

//! The history store interface (§4.F) and its in-memory reference
//! implementation.
//!
//! Every mutating entry point on [`MemoryHistoryStore`] locks its whole
//! document table for the duration of the call; that lock *is* the
//! transaction boundary described in §7 — there is no separate
//! begin/commit/abort API, only a `Result` that is `Ok` on commit and
//! `Err(HistoryError)` on abort.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::commit::Commit;
use crate::commit::validate;
use crate::commit::validate_many;
use crate::conflict::resolve_conflicts;
use crate::document::fold_chain;
use crate::error::HistoryError;
use crate::error::HistoryResult;
use crate::id::CommitId;
use crate::id::DocumentId;
use crate::patch::invert_patch;
use crate::settings::Settings;
use crate::squash::do_squash;
use crate::squash::should_autosquash;

/// The behavioral contract the core requires from a storage backend
/// (§4.F, §6). A real deployment supplies a durable implementation of this
/// trait; [`MemoryHistoryStore`] is the in-memory reference used by this
/// crate's own tests.
pub trait HistoryStore: Send + Sync {
    /// All commits of `document_id`, tip→root.
    fn list(&self, document_id: DocumentId) -> HistoryResult<Vec<Commit>>;
    /// Commits of `document_id` with `order` in `[to.order, from.order]`,
    /// tip→root. `from = None` means "current tip"; `to = None` means
    /// "chain root".
    fn list_range(
        &self,
        document_id: DocumentId,
        from: Option<CommitId>,
        to: Option<CommitId>,
    ) -> HistoryResult<Vec<Commit>>;
    /// A single commit, or `DoesNotExist`.
    fn get(&self, document_id: DocumentId, commit_id: CommitId) -> HistoryResult<Commit>;
    /// Appends one commit onto its document's chain.
    fn write(&self, commit: Commit) -> HistoryResult<Commit>;
    /// Appends several commits atomically; all-or-nothing.
    fn write_many(&self, commits: Vec<Commit>) -> HistoryResult<Vec<Commit>>;
    /// Validates, resolves conflicts against the current tip, and writes —
    /// all in one transaction.
    fn add_commits(&self, commits: Vec<Commit>) -> HistoryResult<Vec<Commit>>;
    /// Merges two adjacent commits into one, per §4.D.
    fn squash(&self, id1: CommitId, id2: CommitId) -> HistoryResult<Commit>;
    /// Removes a commit, reparenting any child onto its parent. Idempotent.
    fn delete(&self, commit_id: CommitId) -> HistoryResult<()>;
}

fn initial_document_state() -> Value {
    Value::Object(serde_json::Map::new())
}

fn renumber(chain: &mut [Commit]) {
    for (index, commit) in chain.iter_mut().enumerate() {
        commit.order = index as u64;
    }
}

/// An in-memory, mutex-guarded [`HistoryStore`]. Every document's chain is
/// kept root→tip internally; `list` reverses it to the tip→root order
/// callers expect.
pub struct MemoryHistoryStore {
    documents: Mutex<HashMap<DocumentId, Vec<Commit>>>,
    settings: Settings,
}

impl MemoryHistoryStore {
    /// Creates an empty store governed by `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            settings,
        }
    }

    fn find_document_of(
        documents: &HashMap<DocumentId, Vec<Commit>>,
        commit_id: CommitId,
    ) -> Option<DocumentId> {
        documents
            .iter()
            .find(|(_, chain)| chain.iter().any(|c| c.id == commit_id))
            .map(|(document_id, _)| *document_id)
    }

    /// Writes `commit` onto `chain` in place. Used both for a single live
    /// write (`chain` is the document's actual stored chain) and for
    /// batched writes, where callers pass a scratch clone so a failure
    /// partway through a batch never touches the real map (§4.F, §7:
    /// batches are all-or-nothing).
    fn write_onto_chain(
        chain: &mut Vec<Commit>,
        settings: &Settings,
        mut commit: Commit,
    ) -> HistoryResult<Commit> {
        validate(&commit)?;
        if chain.iter().any(|existing| existing.id == commit.id) {
            return Err(HistoryError::AlreadyExist {
                struct_name: "Commit",
                id: commit.id.to_string(),
            });
        }
        let expected_parent = chain.last().map(|tip| tip.id);
        if commit.previous_commit_id != expected_parent {
            return Err(HistoryError::DoesNotExist {
                struct_name: "Commit",
                id: expected_parent.map_or_else(|| "<document root>".to_string(), |id| id.to_string()),
            });
        }

        let pre_state = fold_chain(&initial_document_state(), chain)?;
        commit.reverse_patch = invert_patch(&pre_state, &commit.patch)?;
        commit.order = chain.len() as u64;

        if let Some(tip) = chain.last()
            && should_autosquash(tip, &commit, settings)?
        {
            let squashed = do_squash(tip, &commit);
            debug!(
                surviving_id = %squashed.id,
                absorbed_id = %commit.id,
                "autosquashing incoming commit into tip"
            );
            let last = chain.last_mut().expect("checked above");
            *last = squashed.clone();
            return Ok(squashed);
        }

        chain.push(commit.clone());
        Ok(commit)
    }

    fn write_locked(
        documents: &mut HashMap<DocumentId, Vec<Commit>>,
        settings: &Settings,
        commit: Commit,
    ) -> HistoryResult<Commit> {
        let chain = documents.entry(commit.document_id).or_default();
        Self::write_onto_chain(chain, settings, commit)
    }

    /// Writes every commit in `commits` (which must already share one
    /// `document_id`, per `validate_many`) onto a scratch copy of that
    /// document's chain, committing the scratch copy back to `documents`
    /// only if every write succeeds. A mid-batch failure leaves `documents`
    /// exactly as it was.
    fn write_batch_atomically(
        documents: &mut HashMap<DocumentId, Vec<Commit>>,
        settings: &Settings,
        document_id: DocumentId,
        commits: Vec<Commit>,
    ) -> HistoryResult<Vec<Commit>> {
        let mut scratch = documents.get(&document_id).cloned().unwrap_or_default();
        let mut written = Vec::with_capacity(commits.len());
        for commit in commits {
            written.push(Self::write_onto_chain(&mut scratch, settings, commit)?);
        }
        documents.insert(document_id, scratch);
        Ok(written)
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn list(&self, document_id: DocumentId) -> HistoryResult<Vec<Commit>> {
        let documents = self.documents.lock().expect("store mutex poisoned");
        let mut chain = documents.get(&document_id).cloned().unwrap_or_default();
        chain.reverse();
        Ok(chain)
    }

    fn list_range(
        &self,
        document_id: DocumentId,
        from: Option<CommitId>,
        to: Option<CommitId>,
    ) -> HistoryResult<Vec<Commit>> {
        let documents = self.documents.lock().expect("store mutex poisoned");
        let chain = documents.get(&document_id).cloned().unwrap_or_default();
        let from_order = match from {
            Some(id) => chain
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.order)
                .ok_or_else(|| HistoryError::DoesNotExist {
                    struct_name: "Commit",
                    id: id.to_string(),
                })?,
            None => chain.last().map_or(0, |tip| tip.order),
        };
        let to_order = match to {
            Some(id) => chain
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.order)
                .ok_or_else(|| HistoryError::DoesNotExist {
                    struct_name: "Commit",
                    id: id.to_string(),
                })?,
            None => 0,
        };
        let mut page: Vec<Commit> = chain
            .into_iter()
            .filter(|c| c.order >= to_order && c.order <= from_order)
            .collect();
        if from.is_none() && to.is_none() {
            page.truncate(self.settings.default_page_size);
        }
        page.reverse();
        Ok(page)
    }

    fn get(&self, document_id: DocumentId, commit_id: CommitId) -> HistoryResult<Commit> {
        let documents = self.documents.lock().expect("store mutex poisoned");
        documents
            .get(&document_id)
            .and_then(|chain| chain.iter().find(|c| c.id == commit_id))
            .cloned()
            .ok_or_else(|| HistoryError::DoesNotExist {
                struct_name: "Commit",
                id: commit_id.to_string(),
            })
    }

    fn write(&self, commit: Commit) -> HistoryResult<Commit> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        Self::write_locked(&mut documents, &self.settings, commit)
    }

    fn write_many(&self, commits: Vec<Commit>) -> HistoryResult<Vec<Commit>> {
        validate_many(&commits)?;
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        let Some(first) = commits.first() else {
            return Ok(Vec::new());
        };
        let document_id = first.document_id;
        Self::write_batch_atomically(&mut documents, &self.settings, document_id, commits)
    }

    fn add_commits(&self, commits: Vec<Commit>) -> HistoryResult<Vec<Commit>> {
        validate_many(&commits)?;
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        let Some(first) = commits.first() else {
            return Ok(Vec::new());
        };
        let document_id = first.document_id;
        let mut history = documents.get(&document_id).cloned().unwrap_or_default();
        history.reverse();
        let resolved = resolve_conflicts(&commits, &history, &self.settings)?;
        Self::write_batch_atomically(&mut documents, &self.settings, document_id, resolved)
    }

    fn squash(&self, id1: CommitId, id2: CommitId) -> HistoryResult<Commit> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        let document_id = Self::find_document_of(&documents, id1).ok_or_else(|| {
            HistoryError::DoesNotExist {
                struct_name: "Commit",
                id: id1.to_string(),
            }
        })?;
        let chain = documents
            .get_mut(&document_id)
            .expect("find_document_of only returns present documents");
        let Some(earlier_index) = chain.iter().position(|c| c.id == id1) else {
            return Err(HistoryError::DoesNotExist {
                struct_name: "Commit",
                id: id1.to_string(),
            });
        };
        let Some(later_index) = chain.iter().position(|c| c.id == id2) else {
            return Err(HistoryError::DoesNotExist {
                struct_name: "Commit",
                id: id2.to_string(),
            });
        };
        if later_index != earlier_index + 1 || chain[later_index].previous_commit_id != Some(id1) {
            return Err(HistoryError::validation(
                "Commit",
                "previous_commit_id",
                format!("{id2} immediately follows {id1}"),
                "non-adjacent commits",
            ));
        }
        let squashed = do_squash(&chain[earlier_index], &chain[later_index]);
        chain.remove(later_index);
        chain[earlier_index] = squashed.clone();
        if let Some(child) = chain.get_mut(later_index) {
            child.previous_commit_id = Some(squashed.id);
        }
        renumber(chain);
        info!(surviving_id = %squashed.id, absorbed_id = %id2, "explicit squash");
        Ok(squashed)
    }

    fn delete(&self, commit_id: CommitId) -> HistoryResult<()> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        let Some(document_id) = Self::find_document_of(&documents, commit_id) else {
            return Ok(());
        };
        let chain = documents
            .get_mut(&document_id)
            .expect("find_document_of only returns present documents");
        let Some(index) = chain.iter().position(|c| c.id == commit_id) else {
            return Ok(());
        };
        let removed = chain.remove(index);
        for child in chain.iter_mut().skip(index) {
            if child.previous_commit_id == Some(commit_id) {
                child.previous_commit_id = removed.previous_commit_id;
            }
        }
        renumber(chain);
        Ok(())
    }
}
