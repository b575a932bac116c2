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

//! The closed error taxonomy shared by every fallible operation in this crate.

use thiserror::Error;

use crate::id::CommitId;

/// Every error the core can produce. Deliberately closed: callers match on it
/// exhaustively rather than treating failures as opaque strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A structural check on a field failed.
    #[error("{struct_name}.{field}: expected {expected}, got {got}")]
    Validation {
        /// Name of the struct being validated (`"Commit"`, `"PatchOp"`, ...).
        struct_name: &'static str,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of what was expected.
        expected: String,
        /// What was actually found.
        got: String,
    },

    /// A referenced entity does not exist in the store.
    #[error("{struct_name} {id} does not exist")]
    DoesNotExist {
        /// Name of the missing entity's type.
        struct_name: &'static str,
        /// Its id, rendered for display.
        id: String,
    },

    /// A write collided with an existing record.
    #[error("{struct_name} {id} already exists")]
    AlreadyExist {
        /// Name of the duplicated entity's type.
        struct_name: &'static str,
        /// Its id, rendered for display.
        id: String,
    },

    /// An incoming commit could not be resolved against history without a
    /// three-way merge, which this core does not perform.
    #[error("commit {commit_id} conflicts with {conflicts_with}")]
    Conflict {
        /// The incoming commit that could not be placed.
        commit_id: CommitId,
        /// The existing history commit it overlaps with.
        conflicts_with: CommitId,
    },
}

impl HistoryError {
    /// Shorthand for the common case of a field holding the wrong shape.
    pub fn validation(
        struct_name: &'static str,
        field: &'static str,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        HistoryError::Validation {
            struct_name,
            field,
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type HistoryResult<T> = Result<T, HistoryError>;
