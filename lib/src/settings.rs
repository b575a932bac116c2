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

//! Ambient per-instance configuration (§4.I): not part of the distilled
//! design, carried because a deployable core needs somewhere to put these
//! knobs rather than hardcoding them.

/// Configuration threaded read-only through a `HistoryStore` instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Master switch for the §4.D autosquash policy. When `false`, adjacent
    /// `autosquash`-flagged commits are written as distinct commits and
    /// callers must merge them explicitly via `squash(id1, id2)`.
    pub autosquash_enabled: bool,
    /// Upper bound `list(document_id, from, to)` applies when a caller does
    /// not narrow the range, so an unbounded document history can't flood a
    /// single response.
    pub default_page_size: usize,
    /// Whether conflict resolution emits a `tracing::warn!` breadcrumb.
    /// Validation failures never log above `debug`, since they represent
    /// ordinary bad input rather than a system-level event.
    pub log_conflicts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosquash_enabled: true,
            default_page_size: 100,
            log_conflicts: true,
        }
    }
}
