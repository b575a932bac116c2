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

//! The squash engine (§4.D): merging two consecutive commits into one, and
//! the autosquash policy governing when a write triggers that merge
//! automatically.

use crate::commit::Commit;
use crate::error::HistoryResult;
use crate::patch::path_set_matches;
use crate::patch::squash as squash_patches;
use crate::settings::Settings;

/// Merges `earlier` and `later` (adjacent, `later.previous_commit_id ==
/// earlier.id`) into one commit that occupies `earlier`'s place in the
/// chain.
///
/// `earlier` and `later` must share a `document_id`; that is a precondition
/// enforced by the caller; a mismatch is a programmer error, not a value
/// this function reports as a `HistoryError`.
pub fn do_squash(earlier: &Commit, later: &Commit) -> Commit {
    assert_eq!(
        earlier.document_id, later.document_id,
        "do_squash requires both commits to belong to the same document"
    );
    Commit {
        id: earlier.id,
        previous_commit_id: earlier.previous_commit_id,
        document_id: earlier.document_id,
        order: earlier.order,
        autosquash: later.autosquash,
        patch: squash_patches(&earlier.patch, &later.patch),
        reverse_patch: squash_patches(&later.reverse_patch, &earlier.reverse_patch),
        meta: later.meta.clone(),
        updated_at: later.updated_at,
    }
}

/// Whether `tip` (the current chain tip) and `incoming` (the commit being
/// written) should be merged by the autosquash policy rather than appended
/// as two distinct commits.
///
/// Both must be flagged `autosquash = true`, the feature must be enabled in
/// `settings`, and the two patches must touch the exact same set of paths
/// (see DESIGN.md for why set equality was chosen over prefix equivalence).
pub fn should_autosquash(tip: &Commit, incoming: &Commit, settings: &Settings) -> HistoryResult<bool> {
    if !settings.autosquash_enabled || !tip.autosquash || !incoming.autosquash {
        return Ok(false);
    }
    path_set_matches(&tip.patch, &incoming.patch)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testutils::CommitBuilder;

    use super::*;
    use crate::document::apply_commit;
    use crate::patch::PatchOp;

    #[test]
    fn squash_preserves_earlier_identity() {
        let earlier = CommitBuilder::root()
            .patch(vec![PatchOp::add("/a", json!(1))])
            .build();
        let later = CommitBuilder::child_of(&earlier)
            .patch(vec![PatchOp::update("/a", json!(2))])
            .meta(json!({"author": "later"}))
            .build();
        let squashed = do_squash(&earlier, &later);
        assert_eq!(squashed.id, earlier.id);
        assert_eq!(squashed.previous_commit_id, earlier.previous_commit_id);
        assert_eq!(squashed.order, earlier.order);
        assert_eq!(squashed.meta, json!({"author": "later"}));
    }

    #[test]
    fn squash_composes_patches_forward() {
        let earlier = CommitBuilder::root()
            .patch(vec![PatchOp::add("/a", json!(1))])
            .build();
        let later = CommitBuilder::child_of(&earlier)
            .patch(vec![PatchOp::update("/a", json!(2))])
            .build();
        let squashed = do_squash(&earlier, &later);
        let sequential = apply_commit(&apply_commit(&json!({}), &earlier).unwrap(), &later).unwrap();
        assert_eq!(
            apply_commit(&json!({}), &squashed).unwrap(),
            sequential
        );
    }

    #[test]
    fn autosquash_requires_matching_paths() {
        let settings = Settings::default();
        let tip = CommitBuilder::root()
            .autosquash(true)
            .patch(vec![PatchOp::add("/a", json!(1))])
            .build();
        let matching = CommitBuilder::child_of(&tip)
            .autosquash(true)
            .patch(vec![PatchOp::update("/a", json!(2))])
            .build();
        let disjoint = CommitBuilder::child_of(&tip)
            .autosquash(true)
            .patch(vec![PatchOp::update("/b", json!(2))])
            .build();
        assert!(should_autosquash(&tip, &matching, &settings).unwrap());
        assert!(!should_autosquash(&tip, &disjoint, &settings).unwrap());
    }

    #[test]
    fn autosquash_respects_disabled_flag_and_setting() {
        let settings = Settings {
            autosquash_enabled: false,
            ..Settings::default()
        };
        let tip = CommitBuilder::root()
            .autosquash(true)
            .patch(vec![PatchOp::add("/a", json!(1))])
            .build();
        let incoming = CommitBuilder::child_of(&tip)
            .autosquash(true)
            .patch(vec![PatchOp::update("/a", json!(2))])
            .build();
        assert!(!should_autosquash(&tip, &incoming, &settings).unwrap());

        let not_flagged = CommitBuilder::child_of(&tip)
            .autosquash(false)
            .patch(vec![PatchOp::update("/a", json!(2))])
            .build();
        assert!(!should_autosquash(&tip, &not_flagged, &Settings::default()).unwrap());
    }
}
