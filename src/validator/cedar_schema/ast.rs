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

//! The typed in-memory model for a Cedar schema, shared by both input
//! syntaxes (spec.md §3). The human-readable parser and the JSON codec both
//! produce this same AST; the emitter and the resolver both only read it.

use std::iter::once;

use crate::ast::{Id, InternalName};
use crate::parser::{AsLocRef, Loc, MaybeLoc, Node};
use either::Either;
use itertools::Itertools;
use nonempty::NonEmpty;
use smol_str::SmolStr;
#[allow(unused_imports)]
use smol_str::ToSmolStr;

pub use crate::ast::CEDAR_NAMESPACE;

/// The three built-in primitive type names. A bare [`Path`] with one of
/// these names (and no declared common type or entity type shadowing it) is
/// a primitive type, not an entity/common-type reference (spec.md §3, §4.5).
pub const BUILTIN_TYPES: [&str; 3] = ["Long", "String", "Bool"];

/// Cedar's built-in extension type names. Like [`BUILTIN_TYPES`], a bare
/// [`Path`] with one of these names is ambiguous until the resolver checks
/// for shadowing by a declared common type or entity type (spec.md §3, §9).
pub const EXTENSION_TYPES: [&str; 4] = ["ipaddr", "decimal", "datetime", "duration"];

/// A value annotated with `@key("value")`-style [`Annotations`](crate::ast::Annotations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<T> {
    pub data: T,
    pub annotations: crate::ast::Annotations,
}

/// The schema root: a sequence of namespaces, one of which may be
/// unqualified (the top level). Spec.md §3 describes this as "a mapping of
/// namespace name -> Namespace plus the top-level mappings"; representing
/// the top level as a [`Namespace`] with `name: None` inside the same `Vec`
/// unifies the two without losing any information, and is how the parser
/// naturally produces it (declarations outside any `namespace { ... }`
/// block are collected into an implicit, unqualified namespace).
pub type Schema = Vec<Annotated<Namespace>>;

/// A non empty list of identifiers that forms a namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Node<PathInternal>);

impl Path {
    pub fn single(basename: Id, loc: MaybeLoc) -> Self {
        Self(Node::with_maybe_source_loc(
            PathInternal {
                basename,
                namespace: vec![],
            },
            loc,
        ))
    }

    pub fn new(basename: Id, namespace: impl IntoIterator<Item = Id>, loc: MaybeLoc) -> Self {
        let namespace = namespace.into_iter().collect();
        Self(Node::with_maybe_source_loc(
            PathInternal { basename, namespace },
            loc,
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.0.node.iter()
    }

    pub fn loc(&self) -> Option<&Loc> {
        self.0.loc.as_loc_ref()
    }

    pub fn maybe_loc(&self) -> MaybeLoc {
        self.0.loc.clone()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn into_iter(self) -> impl Iterator<Item = Node<Id>> {
        let loc = self.0.loc;
        self.0
            .node
            .into_iter()
            .map(move |x| Node::with_maybe_source_loc(x, loc.clone()))
    }

    /// The (possibly empty) namespace prefix and the base name.
    pub fn split_last(self) -> (Vec<Id>, Id) {
        (self.0.node.namespace, self.0.node.basename)
    }

    /// Is this a single-segment path, i.e. could it name a builtin type?
    pub fn as_single_ident(&self) -> Option<&Id> {
        if self.0.node.namespace.is_empty() {
            Some(&self.0.node.basename)
        } else {
            None
        }
    }

    pub fn is_in_cedar(&self) -> bool {
        self.0.node.is_in_cedar()
    }
}

impl From<Path> for InternalName {
    fn from(value: Path) -> Self {
        InternalName::new(value.0.node.basename, value.0.node.namespace, value.0.loc)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathInternal {
    basename: Id,
    namespace: Vec<Id>,
}

impl PathInternal {
    fn iter(&self) -> impl Iterator<Item = &Id> {
        self.namespace.iter().chain(once(&self.basename))
    }

    fn is_in_cedar(&self) -> bool {
        match self.namespace.as_slice() {
            [id] => id.as_ref() == CEDAR_NAMESPACE,
            _ => false,
        }
    }
}

impl IntoIterator for PathInternal {
    type Item = Id;
    type IntoIter = std::iter::Chain<<Vec<Id> as IntoIterator>::IntoIter, std::iter::Once<Id>>;

    fn into_iter(self) -> Self::IntoIter {
        self.namespace.into_iter().chain(once(self.basename))
    }
}

impl std::fmt::Display for PathInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.basename)
        } else {
            let namespace = self.namespace.iter().map(|id| id.as_ref()).join("::");
            write!(f, "{namespace}::{}", self.basename)
        }
    }
}

/// A (possibly namespace-qualified) entity-UID reference appearing in an
/// action's `memberOf` or `in`, e.g. `"readActions"` or `Admin::"root"`
/// (spec.md §3's `EntityRef`).
#[derive(Debug, Clone)]
pub struct QualName {
    pub path: Option<Path>,
    pub eid: SmolStr,
}

impl QualName {
    pub fn unqualified(eid: SmolStr) -> Self {
        Self { path: None, eid }
    }

    pub fn qualified(path: Path, eid: SmolStr) -> Self {
        Self { path: Some(path), eid }
    }
}

/// One namespace's declarations. `name == None` is the top level.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: Option<Path>,
    pub decls: Vec<Annotated<Node<Declaration>>>,
    pub loc: MaybeLoc,
}

impl Namespace {
    pub fn is_unqualified(&self) -> bool {
        self.name.is_none()
    }
}

pub trait Decl {
    fn names(&self) -> Vec<Node<SmolStr>>;
}

/// A declaration inside a namespace (or the top level): an entity type, an
/// action, or a common type alias.
#[derive(Debug, Clone)]
pub enum Declaration {
    Entity(EntityDecl),
    Action(ActionDecl),
    Type(TypeDecl),
}

/// A common-type alias: `type N = T;`. Inlined away by the resolver.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: Node<Id>,
    pub def: Node<Type>,
}

impl Decl for TypeDecl {
    fn names(&self) -> Vec<Node<SmolStr>> {
        vec![self.name.clone().map(|id| id.to_smolstr())]
    }
}

#[derive(Debug, Clone)]
pub enum EntityDecl {
    Standard(StandardEntityDecl),
    Enum(EnumEntityDecl),
}

impl EntityDecl {
    pub fn names(&self) -> Box<dyn Iterator<Item = &Node<Id>> + '_> {
        match self {
            Self::Enum(d) => Box::new(d.names.iter()),
            Self::Standard(d) => Box::new(d.names.iter()),
        }
    }
}

/// `entity A, B in [Grp] { shape } tags T;` — one or more names sharing an
/// identical body (spec.md §4.2's "comma-separated declaration heads").
#[derive(Debug, Clone)]
pub struct StandardEntityDecl {
    pub names: NonEmpty<Node<Id>>,
    pub member_of_types: Vec<Path>,
    /// `None` when no `=`/`{` shape was written at all; `Some` with an empty
    /// `Vec` when an explicit empty shape `{}` was written. The two emit
    /// differently: the former has no `= {}` at all, the latter does.
    pub attrs: Option<Node<Vec<Node<Annotated<AttrDecl>>>>>,
    pub tags: Option<Node<Type>>,
}

/// `entity Status enum ["a", "b"];` — never comma-headed (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct EnumEntityDecl {
    pub names: NonEmpty<Node<Id>>,
    /// The enumerated values, in source order. May be empty; see
    /// DESIGN.md's resolution of spec.md §9's open question about
    /// duplicate enum values, which this crate accepts rather than rejects.
    pub choices: Vec<Node<SmolStr>>,
}

/// A type expression. `Set`/`Record` are structural; a bare [`Path`] is
/// ambiguous between a primitive, an extension, an entity type, and a common
/// type until the resolver classifies it (spec.md §3, §9 design note (a)).
#[derive(Debug, Clone)]
pub enum Type {
    Set(Box<Node<Type>>),
    Ident(Path),
    Record(Vec<Node<Annotated<AttrDecl>>>),
}

/// One `name: Type` or `name?: Type` pair inside a record or entity shape.
#[derive(Debug, Clone)]
pub struct AttrDecl {
    pub name: Node<SmolStr>,
    pub required: bool,
    pub ty: Node<Type>,
}

/// Which half of an action's `appliesTo` a [`PRAppDecl`] constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PR {
    Principal,
    Resource,
}

impl std::fmt::Display for PR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PR::Principal => write!(f, "principal"),
            PR::Resource => write!(f, "resource"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PRAppDecl {
    pub kind: Node<PR>,
    /// The listed entity types. "Unconstrained" (any type allowed) is
    /// represented by omitting this [`PRAppDecl`] from `appliesTo` entirely,
    /// not by a state of this field — so an empty `Vec` unambiguously means
    /// "no entity type may be used here". The Cedar grammar itself has no way
    /// to write `[]` in this position, but the JSON codec's `ApplySpec` can
    /// produce it, which is why this is a plain `Vec` rather than `NonEmpty`.
    pub entity_tys: Vec<Path>,
}

#[derive(Debug, Clone)]
pub enum AppDecl {
    PR(PRAppDecl),
    Context(Either<Path, Node<Vec<Node<Annotated<AttrDecl>>>>>),
}

/// `action "view", "edit" in [...] appliesTo { ... };`
#[derive(Debug, Clone)]
pub struct ActionDecl {
    pub names: NonEmpty<Node<SmolStr>>,
    pub parents: Option<NonEmpty<Node<QualName>>>,
    pub app_decls: Option<Node<NonEmpty<Node<AppDecl>>>>,
}

impl Decl for ActionDecl {
    fn names(&self) -> Vec<Node<SmolStr>> {
        self.names.iter().cloned().collect()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::parser::IntoMaybeLoc;

    use super::*;

    fn loc() -> Loc {
        Loc::new(Some(Arc::from("foo")), crate::parser::Position { line: 1, column: 1 }, 0)
    }

    #[test]
    fn path_iter_returns_most_significant_first() {
        let p = Path::new(
            "baz".parse().unwrap(),
            ["foo".parse().unwrap(), "bar".parse().unwrap()],
            loc().into_maybe_loc(),
        );

        let expected: Vec<Id> = vec!["foo".parse().unwrap(), "bar".parse().unwrap(), "baz".parse().unwrap()];
        let borrowed = p.iter().collect::<Vec<_>>();
        assert_eq!(borrowed, expected.iter().collect::<Vec<_>>());
        let moved = p.into_iter().map(|n| n.node).collect::<Vec<_>>();
        assert_eq!(moved, expected);
    }

    #[test]
    fn is_in_cedar_detects_builtin_namespace() {
        let p = Path::new("ipaddr".parse().unwrap(), [CEDAR_NAMESPACE.parse().unwrap()], None);
        assert!(p.is_in_cedar());
        let p2 = Path::single("ipaddr".parse().unwrap(), None);
        assert!(!p2.is_in_cedar());
    }
}
