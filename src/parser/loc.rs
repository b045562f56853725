/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Source position tracking, shared by the scanner, parser, and every error
//! type that needs to point back at the input.

use std::sync::Arc;

/// A single `(line, column)` position, 1-indexed as required by spec.md's
/// error-message format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source location: an optional filename plus a position and byte offset.
///
/// `filename` is `None` when the caller never supplied one to the `Schema`
/// facade; error messages then render as `line:column` rather than
/// `filename:line:column`, per spec.md §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub filename: Option<Arc<str>>,
    pub pos: Position,
    pub byte_offset: usize,
}

impl Loc {
    pub fn new(filename: Option<Arc<str>>, pos: Position, byte_offset: usize) -> Self {
        Self {
            filename,
            pos,
            byte_offset,
        }
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.filename {
            Some(name) => write!(f, "{name}:{}", self.pos),
            None => write!(f, "{}", self.pos),
        }
    }
}

/// A `Loc` that may be absent, because a node was built programmatically via
/// [`crate::builder`] rather than parsed from source text.
pub type MaybeLoc = Option<Arc<Loc>>;

/// Convenience conversion from an owned [`Loc`] to a [`MaybeLoc`].
pub trait IntoMaybeLoc {
    fn into_maybe_loc(self) -> MaybeLoc;
}

impl IntoMaybeLoc for Loc {
    fn into_maybe_loc(self) -> MaybeLoc {
        Some(Arc::new(self))
    }
}

/// Borrow a [`Loc`] out of a [`MaybeLoc`] without cloning the `Arc`.
pub trait AsLocRef {
    fn as_loc_ref(&self) -> Option<&Loc>;
}

impl AsLocRef for MaybeLoc {
    fn as_loc_ref(&self) -> Option<&Loc> {
        self.as_deref()
    }
}

/// Wraps a value together with the (possibly absent) source location it came
/// from.
///
/// Equality, ordering, and hashing are defined over `node` alone: two nodes
/// parsed from different positions but carrying equal data are the same AST,
/// which is what duplicate-key detection and the round-trip properties in
/// spec.md §8 rely on.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub node: T,
    pub loc: MaybeLoc,
}

impl<T> Node<T> {
    pub fn new(node: T, loc: MaybeLoc) -> Self {
        Self { node, loc }
    }

    pub fn with_source_loc(node: T, loc: Loc) -> Self {
        Self {
            node,
            loc: Some(Arc::new(loc)),
        }
    }

    pub fn with_maybe_source_loc(node: T, loc: MaybeLoc) -> Self {
        Self { node, loc }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Node<U> {
        Node {
            node: f(self.node),
            loc: self.loc,
        }
    }

    pub fn as_ref(&self) -> Node<&T> {
        Node {
            node: &self.node,
            loc: self.loc.clone(),
        }
    }
}

impl<T> AsLocRef for Node<T> {
    fn as_loc_ref(&self) -> Option<&Loc> {
        self.loc.as_loc_ref()
    }
}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}
impl<T: Eq> Eq for Node<T> {}

impl<T: PartialOrd> PartialOrd for Node<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.node.partial_cmp(&other.node)
    }
}
impl<T: Ord> Ord for Node<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.node.cmp(&other.node)
    }
}

impl<T: std::hash::Hash> std::hash::Hash for Node<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.node, f)
    }
}
