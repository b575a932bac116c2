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

//! The conflict resolver (§4.E): rebasing an incoming commit chain onto the
//! current history tip, or reporting the first unresolvable overlap.

use tracing::warn;

use crate::commit::Commit;
use crate::error::HistoryError;
use crate::error::HistoryResult;
use crate::patch::overlap as patches_overlap;
use crate::settings::Settings;

/// True iff `a` and `b`'s forward patches touch any common or nested path.
pub fn overlap(a: &Commit, b: &Commit) -> HistoryResult<bool> {
    patches_overlap(&a.patch, &b.patch)
}

/// Resolves `incoming` (root→tip) against `history` (tip→root), per §4.E.
///
/// Returns the (possibly rebased) incoming chain on success, or
/// `HistoryError::Conflict` naming the first incoming commit and the
/// history commit it cannot be linearized past.
pub fn resolve_conflicts(
    incoming: &[Commit],
    history: &[Commit],
    settings: &Settings,
) -> HistoryResult<Vec<Commit>> {
    let Some(first) = incoming.first() else {
        return Ok(Vec::new());
    };
    let Some(tip) = history.first() else {
        return Ok(incoming.to_vec());
    };
    if first.previous_commit_id == Some(tip.id) {
        return Ok(incoming.to_vec());
    }
    for existing in history {
        if Some(existing.id) == first.previous_commit_id {
            break;
        }
        if overlap(first, existing)? {
            if settings.log_conflicts {
                warn!(
                    commit_id = %first.id,
                    conflicts_with = %existing.id,
                    "conflict detected while resolving incoming commit chain"
                );
            }
            return Err(HistoryError::Conflict {
                commit_id: first.id,
                conflicts_with: existing.id,
            });
        }
    }
    let mut rebased = incoming.to_vec();
    rebased[0].previous_commit_id = Some(tip.id);
    Ok(rebased)
}
