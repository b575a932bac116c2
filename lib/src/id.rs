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

//! Identity types and the UUIDv4 validators from §4.A of the design.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::HistoryError;
use crate::error::HistoryResult;

macro_rules! uuid_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID without checking its version.
            ///
            /// Callers that need the §4.A invariant enforced should go
            /// through [`uuid4`] first.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The wrapped UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id_type!(CommitId, "A commit's globally unique identifier.");
uuid_id_type!(DocumentId, "A document's globally unique identifier.");

/// Validates that `uuid` is a UUIDv4 (the `4` version nibble, variant bits
/// per RFC 4122). Canonical 8-4-4-4-12 lowercase-hex formatting is already
/// guaranteed by the [`Uuid`] type itself, so only the version needs
/// checking here.
pub fn uuid4(struct_name: &'static str, field: &'static str, uuid: Uuid) -> HistoryResult<()> {
    if uuid.get_version_num() == 4 {
        Ok(())
    } else {
        Err(HistoryError::validation(
            struct_name,
            field,
            "a UUIDv4",
            format!("{uuid} (version {})", uuid.get_version_num()),
        ))
    }
}

/// Validates an optional UUIDv4, where `None` represents the "absent"
/// marker allowed for a chain root's `previous_commit_id`.
pub fn maybe_uuid4(
    struct_name: &'static str,
    field: &'static str,
    uuid: Option<Uuid>,
) -> HistoryResult<()> {
    match uuid {
        Some(uuid) => uuid4(struct_name, field, uuid),
        None => Ok(()),
    }
}

/// Anything that can be coerced into a [`CommitId`]: a bare UUID, an
/// already-wrapped id, or a full [`crate::commit::Commit`] (identified by
/// its own `id`). Named `id(x)` in the API surface.
pub trait AsCommitId {
    /// Coerces `self` into the [`CommitId`] it identifies.
    fn as_commit_id(&self) -> CommitId;
}

impl AsCommitId for CommitId {
    fn as_commit_id(&self) -> CommitId {
        *self
    }
}

impl AsCommitId for Uuid {
    fn as_commit_id(&self) -> CommitId {
        CommitId::from_uuid(*self)
    }
}

impl AsCommitId for crate::commit::Commit {
    fn as_commit_id(&self) -> CommitId {
        self.id
    }
}

/// Identity coercion: accepts a commit, a [`CommitId`], or a bare [`Uuid`]
/// and returns the [`CommitId`] it names.
pub fn id(x: impl AsCommitId) -> CommitId {
    x.as_commit_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_v4() {
        let v4 = Uuid::new_v4();
        assert!(uuid4("Commit", "id", v4).is_ok());
    }

    #[test]
    fn rejects_non_v4() {
        let v1 = Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
        let err = uuid4("Commit", "id", v1).unwrap_err();
        assert!(matches!(err, HistoryError::Validation { field: "id", .. }));
    }

    #[test]
    fn maybe_accepts_absent() {
        assert!(maybe_uuid4("Commit", "previous_commit_id", None).is_ok());
    }

    #[test]
    fn id_coerces_uuid_and_commit_id_identically() {
        let uuid = Uuid::new_v4();
        assert_eq!(id(uuid), id(CommitId::from_uuid(uuid)));
    }
}
