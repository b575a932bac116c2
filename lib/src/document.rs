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

//! The document applier (§4.G): folding commit patches into a materialized
//! JSON value.

use serde_json::Value;

use crate::commit::Commit;
use crate::error::HistoryResult;
use crate::patch::apply_patch;

/// Applies a single commit's patch to `value`.
pub fn apply_commit(value: &Value, commit: &Commit) -> HistoryResult<Value> {
    apply_patch(value, &commit.patch)
}

/// Applies a chain of commits in order (root toward tip) to `value`.
///
/// `chain` must already be ordered root→tip; this function does not
/// re-sort. Callers typically pass the reverse of a store's tip→root
/// `list` result.
pub fn fold_chain(value: &Value, chain: &[Commit]) -> HistoryResult<Value> {
    chain.iter().try_fold(value.clone(), |state, commit| {
        apply_commit(&state, commit)
    })
}
