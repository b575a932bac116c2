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

//! The `Commit` record and its single- and chain-level validators (§4.C).

use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::HistoryError;
use crate::error::HistoryResult;
use crate::id::CommitId;
use crate::id::DocumentId;
use crate::id::maybe_uuid4;
use crate::id::uuid4;
use crate::patch::Patch;
use crate::patch::json_patch;

/// A single recorded edit to a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Globally unique identifier, assigned at creation.
    pub id: CommitId,
    /// The chain predecessor, or `None` for a document's root commit.
    pub previous_commit_id: Option<CommitId>,
    /// The document this commit belongs to. Immutable.
    pub document_id: DocumentId,
    /// Position within the document's chain; dense and monotone from root to
    /// tip. Assigned by the store, not by the caller.
    pub order: u64,
    /// Whether this commit is eligible for automatic squashing (§4.D).
    pub autosquash: bool,
    /// The forward edit.
    pub patch: Patch,
    /// The edit that undoes `patch` against the state just before this
    /// commit. Computed by the store at write time.
    pub reverse_patch: Patch,
    /// Opaque author-supplied metadata. Never inspected by the core.
    pub meta: Value,
    /// Timestamp of last squash/rewrite.
    pub updated_at: DateTime<Utc>,
}

impl Commit {
    fn id_uuid(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn previous_uuid(&self) -> Option<Uuid> {
        self.previous_commit_id.map(|id| id.as_uuid())
    }
}

/// Validates a single commit in isolation, per §4.C: `id`, then
/// `previous_commit_id`, then `document_id`, then `patch`, then the
/// no-self-cycle check, in that order, so the first offending field is
/// always what's reported.
pub fn validate(commit: &Commit) -> HistoryResult<()> {
    uuid4("Commit", "id", commit.id_uuid())?;
    maybe_uuid4("Commit", "previous_commit_id", commit.previous_uuid())?;
    uuid4("Commit", "document_id", commit.document_id.as_uuid())?;
    json_patch(&commit.patch).map_err(|_| {
        HistoryError::validation("Commit", "patch", "a valid patch", "a malformed patch")
    })?;
    if commit.previous_commit_id == Some(commit.id) {
        debug!(commit_id = %commit.id, "rejecting self-referential commit");
        return Err(HistoryError::validation(
            "Commit",
            "previous_commit_id",
            "not equal to id",
            commit.id.to_string(),
        ));
    }
    Ok(())
}

/// Validates an ordered root→tip slice of commits as one chain, per §4.C.
pub fn validate_many(commits: &[Commit]) -> HistoryResult<()> {
    let Some(first) = commits.first() else {
        return Ok(());
    };
    for commit in commits {
        validate(commit)?;
    }
    for window in commits.windows(2) {
        let [previous, next] = window else {
            unreachable!("windows(2) always yields pairs")
        };
        if next.previous_commit_id != Some(previous.id) {
            return Err(HistoryError::validation(
                "Commit",
                "previous_commit_id",
                previous.id.to_string(),
                next.previous_commit_id
                    .map_or_else(|| "absent".to_string(), |id| id.to_string()),
            ));
        }
    }
    let document_ids: HashSet<DocumentId> = commits.iter().map(|c| c.document_id).collect();
    if document_ids.len() > 1 {
        return Err(HistoryError::validation(
            "Commit",
            "document_id",
            "a single shared document_id",
            format!("{} distinct document ids", document_ids.len()),
        ));
    }
    if let Some(first_previous) = first.previous_commit_id
        && commits.iter().any(|c| c.id == first_previous)
    {
        return Err(HistoryError::validation(
            "Commit",
            "previous_commit_id",
            "not a successor of any later commit in the batch",
            first_previous.to_string(),
        ));
    }
    Ok(())
}
