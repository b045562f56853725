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

//! Cross-cutting identifier and annotation primitives shared by the scanner,
//! the Cedar-schema AST, the JSON codec, and the resolver.

mod ident;

pub use ident::{AnyId, Id, IdentParseError};

use crate::parser::{MaybeLoc, Node};
use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;

/// The reserved namespace for Cedar's built-in primitive and extension types
/// (e.g. `__cedar::ipaddr`).
pub const CEDAR_NAMESPACE: &str = "__cedar";

/// A fully qualified name: zero or more namespace segments plus a base name.
/// Produced by the resolver when it qualifies a [`Path`]; never produced by
/// the parser directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternalName {
    pub basename: Id,
    pub namespace: Vec<Id>,
}

impl InternalName {
    pub fn new(basename: Id, namespace: impl IntoIterator<Item = Id>, _loc: MaybeLoc) -> Self {
        Self {
            basename,
            namespace: namespace.into_iter().collect(),
        }
    }

    /// The empty-namespace form, e.g. `Action` at the top level.
    pub fn unqualified(basename: Id) -> Self {
        Self {
            basename,
            namespace: vec![],
        }
    }

    pub fn is_in_cedar(&self) -> bool {
        matches!(self.namespace.as_slice(), [ns] if ns.as_ref() == CEDAR_NAMESPACE)
    }
}

impl std::fmt::Display for InternalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.basename)
        } else {
            for seg in &self.namespace {
                write!(f, "{seg}::")?;
            }
            write!(f, "{}", self.basename)
        }
    }
}

/// One `@key("value")` or `@key` annotation.
///
/// `value == None` means the parenthesized value was omitted entirely;
/// `value == Some("".into())` means it was given and empty. Spec.md §3
/// requires these be distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub value: Option<SmolStr>,
    pub loc: MaybeLoc,
}

impl Annotation {
    pub fn with_optional_value(value: Option<SmolStr>, loc: MaybeLoc) -> Self {
        Self { value, loc }
    }
}

/// An insertion-ordered, duplicate-free mapping from annotation key to
/// [`Annotation`]. Used for annotations on every AST node, and reused as the
/// ordered-map building block for entity/action/common-type/namespace
/// containers and record attributes (spec.md §3's "ordered by insertion"
/// requirement).
pub type Annotations = LinkedHashMap<AnyId, Annotation>;

/// Build an [`Annotations`] map from a flat list of parsed `(key, value)`
/// pairs, rejecting duplicate keys.
///
/// Mirrors the teacher's `deduplicate_annotations`, generalized to use an
/// insertion-ordered map instead of a `BTreeMap` so that source order survives
/// into the AST (the emitter is responsible for re-sorting at output time).
pub fn build_annotations(
    annotations: Vec<Node<(Node<AnyId>, Option<Node<SmolStr>>)>>,
) -> Result<Annotations, DuplicateAnnotationError> {
    let mut map: Annotations = LinkedHashMap::new();
    for annotation in annotations {
        let (key, value) = annotation.node;
        if let Some((old_key, _)) = map.iter().find(|(k, _)| **k == key.node) {
            return Err(DuplicateAnnotationError {
                key: key.node,
                first: old_key.clone(),
                second: key.loc,
            });
        }
        let (val, loc) = match value {
            Some(n) => (Some(n.node), n.loc),
            None => (None, None),
        };
        map.insert(key.node, Annotation::with_optional_value(val, loc));
    }
    Ok(map)
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("duplicate annotation `@{key}`")]
pub struct DuplicateAnnotationError {
    pub key: AnyId,
    pub first: AnyId,
    pub second: MaybeLoc,
}
