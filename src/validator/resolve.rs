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

//! Turns a parsed [`Schema`](super::cedar_schema::ast::Schema) into a
//! [`ResolvedSchema`]: every reference qualified to a fully-qualified name,
//! every common type inlined away, every entity type's descendant closure
//! precomputed (spec.md §4.5).
//!
//! Both input syntaxes (the Cedar text parser and the JSON codec) produce the
//! same AST, so this module has exactly one entry point regardless of which
//! syntax a [`crate::Schema`] was built from.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use either::Either;
use miette::Diagnostic;
use smol_str::{SmolStr, ToSmolStr};
use thiserror::Error;

use crate::ast::{Id, InternalName};

use super::cedar_schema::ast::{
    ActionDecl, AppDecl, Declaration, EntityDecl, EnumEntityDecl, Path, QualName, Schema,
    StandardEntityDecl, Type, TypeDecl, BUILTIN_TYPES, EXTENSION_TYPES, PR,
};

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ResolveError {
    #[error("type `{name}` not found")]
    TypeNotFound { name: String },
    #[error("common type cycle through `{0}`")]
    CommonTypeCycle(String),
    #[error("name `{name}` denotes both an entity type and a common type")]
    EntityCommonAmbiguous { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityUID {
    pub ty: InternalName,
    pub id: SmolStr,
}

impl std::fmt::Display for EntityUID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::\"{}\"", self.ty, self.id)
    }
}

/// A type after every common-type reference has been replaced by a deep copy
/// of its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Bool,
    Long,
    String,
    Extension(SmolStr),
    Entity(InternalName),
    Set(Box<ResolvedType>),
    Record(ResolvedRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub ty: ResolvedType,
    pub required: bool,
}

/// An attribute mapping. Order follows declaration order; the resolver does
/// not reorder it — only the emitter imposes a lexicographic order, and only
/// on the way back out to text (spec.md §4.5's determinism note).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedRecord {
    pub attributes: linked_hash_map::LinkedHashMap<SmolStr, ResolvedAttribute>,
}

impl ResolvedRecord {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Standard,
    Enum(Vec<SmolStr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntityType {
    pub name: InternalName,
    /// Entity types that can be members of this one, transitively. Contains
    /// `name` itself iff the `memberOf` relation admits a cycle through it.
    pub descendants: BTreeSet<InternalName>,
    pub attributes: ResolvedRecord,
    pub tags: Option<ResolvedType>,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub uid: EntityUID,
    pub member_of: Vec<EntityUID>,
    /// `None` means unconstrained (no `principal`/`resource` clause, or no
    /// `appliesTo` at all).
    pub principal_types: Option<Vec<InternalName>>,
    pub resource_types: Option<Vec<InternalName>>,
    /// `Record(empty)` when no `context` was written, per the "empty context
    /// normalization" design note: callers should treat that the same as a
    /// literal `context: {}`.
    pub context: ResolvedType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSchema {
    pub entity_types: BTreeMap<InternalName, ResolvedEntityType>,
    pub actions: BTreeMap<EntityUID, ResolvedAction>,
}

enum EntityBody<'a> {
    Standard(&'a StandardEntityDecl),
    Enum(&'a EnumEntityDecl),
}

enum Qualified {
    Bool,
    Long,
    String,
    Extension(SmolStr),
    Entity(InternalName),
    CommonType(InternalName),
}

struct Resolver<'a> {
    common_types: HashMap<InternalName, (&'a TypeDecl, Vec<Id>)>,
    entities: HashMap<InternalName, (EntityBody<'a>, Vec<Id>)>,
    actions: Vec<(Vec<Id>, &'a ActionDecl, SmolStr)>,
    memo: RefCell<HashMap<InternalName, ResolvedType>>,
}

impl<'a> Resolver<'a> {
    fn build(schema: &'a Schema) -> Self {
        let mut common_types = HashMap::new();
        let mut entities = HashMap::new();
        let mut actions = Vec::new();

        for ns in schema {
            let ns_segs: Vec<Id> = ns
                .data
                .name
                .as_ref()
                .map(|p| p.iter().cloned().collect())
                .unwrap_or_default();
            for decl in &ns.data.decls {
                match &decl.data.node {
                    Declaration::Type(t) => {
                        let fqn = InternalName::new(t.name.node.clone(), ns_segs.clone(), None);
                        common_types.insert(fqn, (t, ns_segs.clone()));
                    }
                    Declaration::Entity(EntityDecl::Standard(d)) => {
                        for n in &d.names {
                            let fqn = InternalName::new(n.node.clone(), ns_segs.clone(), None);
                            entities.insert(fqn, (EntityBody::Standard(d), ns_segs.clone()));
                        }
                    }
                    Declaration::Entity(EntityDecl::Enum(d)) => {
                        for n in &d.names {
                            let fqn = InternalName::new(n.node.clone(), ns_segs.clone(), None);
                            entities.insert(fqn, (EntityBody::Enum(d), ns_segs.clone()));
                        }
                    }
                    Declaration::Action(a) => {
                        for n in &a.names {
                            actions.push((ns_segs.clone(), a, n.node.clone()));
                        }
                    }
                }
            }
        }

        Self {
            common_types,
            entities,
            actions,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// spec.md §4.5 step 2's lookup order for a single-identifier reference,
    /// falling back to the builtin primitives and extension types only when
    /// nothing declared shadows the name.
    fn qualify(&self, current_ns: &[Id], path: &Path) -> Result<Qualified, ResolveError> {
        let display = path.to_string();
        let (ns_segs, base) = path.clone().split_last();

        if ns_segs.is_empty() {
            let here = InternalName::new(base.clone(), current_ns.iter().cloned(), None);
            if self.common_types.contains_key(&here) {
                return Ok(Qualified::CommonType(here));
            }
            if self.entities.contains_key(&here) {
                return Ok(Qualified::Entity(here));
            }
            let top = InternalName::unqualified(base.clone());
            if self.common_types.contains_key(&top) {
                return Ok(Qualified::CommonType(top));
            }
            if self.entities.contains_key(&top) {
                return Ok(Qualified::Entity(top));
            }
            if let Some(q) = primitive(base.as_ref()) {
                return Ok(q);
            }
            if EXTENSION_TYPES.contains(&base.as_ref()) {
                return Ok(Qualified::Extension(base.to_smolstr()));
            }
            Err(ResolveError::TypeNotFound { name: display })
        } else {
            let fqn = InternalName::new(base, ns_segs, None);
            if fqn.is_in_cedar() {
                if let Some(q) = primitive(fqn.basename.as_ref()) {
                    return Ok(q);
                }
                if EXTENSION_TYPES.contains(&fqn.basename.as_ref()) {
                    return Ok(Qualified::Extension(fqn.basename.to_smolstr()));
                }
            }
            if self.common_types.contains_key(&fqn) {
                return Ok(Qualified::CommonType(fqn));
            }
            if self.entities.contains_key(&fqn) {
                return Ok(Qualified::Entity(fqn));
            }
            Err(ResolveError::TypeNotFound { name: display })
        }
    }

    fn qualify_entity(&self, current_ns: &[Id], path: &Path) -> Result<InternalName, ResolveError> {
        match self.qualify(current_ns, path)? {
            Qualified::Entity(fqn) => Ok(fqn),
            _ => Err(ResolveError::TypeNotFound { name: path.to_string() }),
        }
    }

    fn resolve_type(
        &self,
        current_ns: &[Id],
        ty: &Type,
        stack: &mut Vec<InternalName>,
    ) -> Result<ResolvedType, ResolveError> {
        match ty {
            Type::Set(inner) => Ok(ResolvedType::Set(Box::new(self.resolve_type(
                current_ns,
                &inner.node,
                stack,
            )?))),
            Type::Record(fields) => Ok(ResolvedType::Record(self.resolve_record(current_ns, fields, stack)?)),
            Type::Ident(path) => match self.qualify(current_ns, path)? {
                Qualified::Bool => Ok(ResolvedType::Bool),
                Qualified::Long => Ok(ResolvedType::Long),
                Qualified::String => Ok(ResolvedType::String),
                Qualified::Extension(name) => Ok(ResolvedType::Extension(name)),
                Qualified::Entity(fqn) => Ok(ResolvedType::Entity(fqn)),
                Qualified::CommonType(fqn) => self.inline_common_type(&fqn, stack),
            },
        }
    }

    fn resolve_record(
        &self,
        current_ns: &[Id],
        fields: &[crate::parser::Node<super::cedar_schema::ast::Annotated<super::cedar_schema::ast::AttrDecl>>],
        stack: &mut Vec<InternalName>,
    ) -> Result<ResolvedRecord, ResolveError> {
        let mut attributes = linked_hash_map::LinkedHashMap::new();
        for f in fields {
            let ty = self.resolve_type(current_ns, &f.node.data.ty.node, stack)?;
            attributes.insert(
                f.node.data.name.node.clone(),
                ResolvedAttribute {
                    ty,
                    required: f.node.data.required,
                },
            );
        }
        Ok(ResolvedRecord { attributes })
    }

    fn inline_common_type(&self, fqn: &InternalName, stack: &mut Vec<InternalName>) -> Result<ResolvedType, ResolveError> {
        if let Some(cached) = self.memo.borrow().get(fqn) {
            return Ok(cached.clone());
        }
        if stack.contains(fqn) {
            return Err(ResolveError::CommonTypeCycle(fqn.to_string()));
        }
        let (decl, own_ns) = self.common_types.get(fqn).expect("qualify only returns known common types");
        stack.push(fqn.clone());
        let resolved = stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
            self.resolve_type(own_ns, &decl.def.node, stack)
        })?;
        stack.pop();
        self.memo.borrow_mut().insert(fqn.clone(), resolved.clone());
        Ok(resolved)
    }

    fn resolve_entity_type(
        &self,
        fqn: &InternalName,
        descendants: &HashMap<InternalName, BTreeSet<InternalName>>,
    ) -> Result<ResolvedEntityType, ResolveError> {
        let (body, own_ns) = self.entities.get(fqn).expect("known fqn");
        let desc = descendants.get(fqn).cloned().unwrap_or_default();
        match body {
            EntityBody::Standard(d) => {
                let mut stack = Vec::new();
                let attributes = match &d.attrs {
                    Some(node) => self.resolve_record(own_ns, &node.node, &mut stack)?,
                    None => ResolvedRecord::default(),
                };
                let tags = match &d.tags {
                    Some(t) => Some(self.resolve_type(own_ns, &t.node, &mut stack)?),
                    None => None,
                };
                Ok(ResolvedEntityType {
                    name: fqn.clone(),
                    descendants: desc,
                    attributes,
                    tags,
                    kind: EntityKind::Standard,
                })
            }
            EntityBody::Enum(d) => Ok(ResolvedEntityType {
                name: fqn.clone(),
                descendants: desc,
                attributes: ResolvedRecord::default(),
                tags: None,
                kind: EntityKind::Enum(d.choices.iter().map(|c| c.node.clone()).collect()),
            }),
        }
    }

    fn resolve_action(&self, ns: &[Id], d: &ActionDecl, name: &SmolStr) -> Result<ResolvedAction, ResolveError> {
        let uid = EntityUID {
            ty: action_type_for_ns(ns),
            id: name.clone(),
        };
        let member_of = match &d.parents {
            Some(parents) => parents.iter().map(|p| self.qualname_to_action_uid(ns, &p.node)).collect(),
            None => Vec::new(),
        };

        let mut principal_types = None;
        let mut resource_types = None;
        let mut context = ResolvedType::Record(ResolvedRecord::default());

        if let Some(app) = &d.app_decls {
            let mut stack = Vec::new();
            for item in app.node.iter() {
                match &item.node {
                    AppDecl::PR(pr) => {
                        let tys = pr
                            .entity_tys
                            .iter()
                            .map(|p| self.qualify_entity(ns, p))
                            .collect::<Result<Vec<_>, _>>()?;
                        match pr.kind.node {
                            PR::Principal => principal_types = Some(tys),
                            PR::Resource => resource_types = Some(tys),
                        }
                    }
                    AppDecl::Context(ctx) => {
                        context = match ctx {
                            Either::Left(path) => self.resolve_type(ns, &Type::Ident(path.clone()), &mut stack)?,
                            Either::Right(fields) => ResolvedType::Record(self.resolve_record(ns, &fields.node, &mut stack)?),
                        };
                    }
                }
            }
        }

        Ok(ResolvedAction {
            uid,
            member_of,
            principal_types,
            resource_types,
            context,
        })
    }

    fn qualname_to_action_uid(&self, ns: &[Id], qn: &QualName) -> EntityUID {
        match &qn.path {
            None => EntityUID {
                ty: action_type_for_ns(ns),
                id: qn.eid.clone(),
            },
            Some(p) => EntityUID {
                ty: p.clone().into(),
                id: qn.eid.clone(),
            },
        }
    }
}

fn primitive(name: &str) -> Option<Qualified> {
    if !BUILTIN_TYPES.contains(&name) {
        return None;
    }
    match name {
        "Bool" => Some(Qualified::Bool),
        "Long" => Some(Qualified::Long),
        "String" => Some(Qualified::String),
        _ => None,
    }
}

fn action_type_for_ns(ns: &[Id]) -> InternalName {
    let action_id: Id = "Action".parse().expect("\"Action\" is a valid identifier");
    InternalName::new(action_id, ns.iter().cloned(), None)
}

fn build_reverse(forward: &HashMap<InternalName, Vec<InternalName>>) -> HashMap<InternalName, Vec<InternalName>> {
    let mut reverse: HashMap<InternalName, Vec<InternalName>> = HashMap::new();
    for (child, parents) in forward {
        for parent in parents {
            reverse.entry(parent.clone()).or_default().push(child.clone());
        }
    }
    reverse
}

/// Two-pass reverse-closure computation (spec.md §9 design note): reverse
/// the forward `memberOf` graph, then DFS from each node over the reverse
/// graph. A node is added to its own descendant set only if the DFS revisits
/// it — i.e. only when `memberOf` admits a cycle through it (spec.md §8
/// property 4).
fn compute_descendants(
    names: &[InternalName],
    reverse: &HashMap<InternalName, Vec<InternalName>>,
) -> HashMap<InternalName, BTreeSet<InternalName>> {
    let mut result = HashMap::new();
    for start in names {
        let mut visited: HashSet<InternalName> = HashSet::new();
        let mut stack: Vec<InternalName> = reverse.get(start).cloned().unwrap_or_default();
        let mut desc: BTreeSet<InternalName> = BTreeSet::new();
        while let Some(n) = stack.pop() {
            if n == *start {
                desc.insert(n.clone());
            }
            if visited.insert(n.clone()) {
                if n != *start {
                    desc.insert(n.clone());
                }
                for child in reverse.get(&n).cloned().unwrap_or_default() {
                    stack.push(child);
                }
            }
        }
        result.insert(start.clone(), desc);
    }
    result
}

/// Resolve a parsed schema, producing a [`ResolvedSchema`] or the first
/// [`ResolveError`] encountered. Mirrors spec.md §4.5's ordered steps: build
/// the name table, qualify every reference (including `memberOf` edges),
/// compute the descendant closure, then assemble entity types and actions.
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema, ResolveError> {
    let r = Resolver::build(schema);

    let mut forward_edges: HashMap<InternalName, Vec<InternalName>> = HashMap::new();
    for (fqn, (body, ns)) in &r.entities {
        if let EntityBody::Standard(d) = body {
            let mut parents = Vec::with_capacity(d.member_of_types.len());
            for p in &d.member_of_types {
                parents.push(r.qualify_entity(ns, p)?);
            }
            forward_edges.insert(fqn.clone(), parents);
        } else {
            forward_edges.insert(fqn.clone(), Vec::new());
        }
    }
    let all_names: Vec<InternalName> = r.entities.keys().cloned().collect();
    let reverse = build_reverse(&forward_edges);
    let descendants = compute_descendants(&all_names, &reverse);

    let mut entity_types = BTreeMap::new();
    for fqn in &all_names {
        entity_types.insert(fqn.clone(), r.resolve_entity_type(fqn, &descendants)?);
    }

    let mut actions = BTreeMap::new();
    for (ns, decl, name) in &r.actions {
        let resolved = r.resolve_action(ns, decl, name)?;
        actions.insert(resolved.uid.clone(), resolved);
    }

    Ok(ResolvedSchema { entity_types, actions })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::validator::cedar_schema::parser::parse_schema;

    fn resolve_src(src: &str) -> Result<ResolvedSchema, ResolveError> {
        let ast = parse_schema(src.as_bytes(), None).unwrap();
        resolve(&ast)
    }

    #[test]
    fn s2_descendant_closure() {
        let r = resolve_src("entity User, Admin in [Group] { name: String } tags Long; entity Group;").unwrap();
        let group: InternalName = InternalName::unqualified("Group".parse().unwrap());
        let desc = &r.entity_types[&group].descendants;
        assert_eq!(desc.len(), 2);
        assert!(desc.contains(&InternalName::unqualified("User".parse().unwrap())));
        assert!(desc.contains(&InternalName::unqualified("Admin".parse().unwrap())));
    }

    #[test]
    fn s7_self_referential_memberof_is_its_own_descendant() {
        let r = resolve_src("entity A in [A];").unwrap();
        let a = InternalName::unqualified("A".parse().unwrap());
        assert!(r.entity_types[&a].descendants.contains(&a));
    }

    #[test]
    fn s4_action_uid_and_memberof() {
        let r = resolve_src(r#"action view in "readActions";"#).unwrap();
        let uid = EntityUID {
            ty: InternalName::unqualified("Action".parse().unwrap()),
            id: "view".into(),
        };
        let action = &r.actions[&uid];
        assert_eq!(action.member_of.len(), 1);
        assert_eq!(action.member_of[0].id, "readActions");
    }

    #[test]
    fn common_type_is_inlined() {
        let r = resolve_src("type Name = String; entity User { n: Name };").unwrap();
        let user = InternalName::unqualified("User".parse().unwrap());
        let attrs = &r.entity_types[&user].attributes;
        assert_eq!(attrs.attributes.get("n").unwrap().ty, ResolvedType::String);
    }

    #[test]
    fn common_type_cycle_is_an_error() {
        let res = resolve_src("type A = B; type B = A; entity E { x: A };");
        assert!(matches!(res, Err(ResolveError::CommonTypeCycle(_))));
    }

    #[test]
    fn undefined_type_reference_errors() {
        let res = resolve_src("entity User { x: Nonexistent };");
        assert!(matches!(res, Err(ResolveError::TypeNotFound { .. })));
    }

    #[test]
    fn extension_type_resolves() {
        let r = resolve_src("entity User { addr: ipaddr };").unwrap();
        let user = InternalName::unqualified("User".parse().unwrap());
        let ty = &r.entity_types[&user].attributes.attributes.get("addr").unwrap().ty;
        assert_eq!(*ty, ResolvedType::Extension("ipaddr".into()));
    }

    #[test]
    fn resolve_is_deterministic_across_calls() {
        let ast = parse_schema(b"entity A in [B]; entity B;", None).unwrap();
        let r1 = resolve(&ast).unwrap();
        let r2 = resolve(&ast).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn shadowing_primitive_name_is_not_an_error() {
        // `Long` shadowed by a declared common type in the same namespace.
        let r = resolve_src("type Long = String; entity E { x: Long };").unwrap();
        let e = InternalName::unqualified("E".parse().unwrap());
        let ty = &r.entity_types[&e].attributes.attributes.get("x").unwrap().ty;
        assert_eq!(*ty, ResolvedType::String);
    }
}
