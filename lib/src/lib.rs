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

//! The versioned-document core of a collaborative editing backend.
//!
//! This crate answers one question: given a stream of incoming commits from
//! concurrent authors, can they be linearized onto a document's existing
//! history? If so, it extends the history; if not, it reports a precise
//! conflict for the caller to resolve and resubmit.
//!
//! The pieces, leaves first:
//! - [`path`] and [`id`] — structural validators for JSON pointers and
//!   UUIDv4 identifiers.
//! - [`patch`] — the patch algebra (`apply`, `invert`, `overlap`, `squash`)
//!   that everything else is built on.
//! - [`commit`] — the `Commit` record and its single- and chain-level
//!   validation.
//! - [`document`] — folding a commit chain into a materialized JSON value.
//! - [`squash`] — merging two commits, explicitly or via the autosquash
//!   policy.
//! - [`conflict`] — rebasing an incoming chain onto history, or reporting
//!   why it can't be.
//! - [`store`] — the storage-backend contract and its in-memory reference
//!   implementation.
//! - [`settings`] — ambient per-instance configuration.
//! - [`error`] — the closed error taxonomy shared by all of the above.

pub mod commit;
pub mod conflict;
pub mod document;
pub mod error;
pub mod id;
pub mod patch;
pub mod path;
pub mod settings;
pub mod squash;
pub mod store;

pub use commit::Commit;
pub use commit::validate;
pub use commit::validate_many;
pub use conflict::overlap;
pub use conflict::resolve_conflicts;
pub use document::apply_commit;
pub use document::fold_chain;
pub use error::HistoryError;
pub use error::HistoryResult;
pub use id::AsCommitId;
pub use id::CommitId;
pub use id::DocumentId;
pub use id::id;
pub use patch::OpKind;
pub use patch::Patch;
pub use patch::PatchOp;
pub use settings::Settings;
pub use squash::do_squash;
pub use squash::should_autosquash;
pub use store::HistoryStore;
pub use store::MemoryHistoryStore;
