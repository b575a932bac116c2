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

//! Path segments and the `path(p)` validator from §4.A.
//!
//! Paths travel over the wire as JSON-Pointer-shaped strings (`"/a/b/0"`);
//! this module is where that raw string earns the right to be treated as a
//! sequence of typed segments.

use std::fmt;

use crate::error::HistoryError;
use crate::error::HistoryResult;

/// One step of a path: either an object member name or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object member name.
    Key(String),
    /// A list index.
    Index(usize),
}

/// A validated path into a JSON document. The empty path refers to the
/// document root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The root path (`""`), denoting the whole document value.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The path's segments, root to leaf.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// True if `self` is `other`, or a prefix of it, or it is a prefix of
    /// `self`. Two paths overlap exactly when one would shadow an edit made
    /// through the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        let shorter = self.0.len().min(other.0.len());
        self.0[..shorter] == other.0[..shorter]
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            f.write_str("/")?;
            match segment {
                PathSegment::Key(key) => {
                    f.write_str(&key.replace('~', "~0").replace('/', "~1"))?;
                }
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Validates and parses a raw JSON-Pointer-shaped path string.
///
/// `""` parses to the root path. Any other value must start with `/`; each
/// `/`-delimited token is unescaped (`~1` -> `/`, `~0` -> `~`) and classified
/// as an [`PathSegment::Index`] if it parses as a bare non-negative integer
/// with no leading zero (other than `"0"` itself), and a
/// [`PathSegment::Key`] otherwise.
pub fn path(raw: &str) -> HistoryResult<Path> {
    if raw.is_empty() {
        return Ok(Path::root());
    }
    if !raw.starts_with('/') {
        return Err(HistoryError::validation(
            "Path",
            "path",
            "empty or starting with '/'",
            raw.to_string(),
        ));
    }
    let mut segments = Vec::new();
    for token in raw[1..].split('/') {
        let unescaped = token.replace("~1", "/").replace("~0", "~");
        segments.push(classify(&unescaped));
    }
    Ok(Path(segments))
}

fn classify(token: &str) -> PathSegment {
    let is_index = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if is_index {
        match token.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(token.to_string()),
        }
    } else {
        PathSegment::Key(token.to_string())
    }
}
