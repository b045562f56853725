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

//! A fluent constructor for [`Schema`](crate::validator::cedar_schema::ast::Schema)
//! that yields the exact same AST the parser does (spec.md §2 item 9). Every
//! method parses its string arguments with the same [`Id`]/[`Path`] rules the
//! scanner and parser enforce, so a builder-constructed schema can't smuggle
//! in an identifier the text syntax would reject.

use nonempty::NonEmpty;
use smol_str::SmolStr;

use crate::ast::{Id, IdentParseError};
use crate::parser::Node;
use crate::validator::cedar_schema::ast::{
    ActionDecl, Annotated, AppDecl, Declaration, EntityDecl, EnumEntityDecl, Namespace, Path, PRAppDecl, QualName,
    Schema, StandardEntityDecl, Type, PR,
};

fn node<T>(v: T) -> Node<T> {
    Node::with_maybe_source_loc(v, None)
}

fn path_from_str(s: &str) -> Result<Path, IdentParseError> {
    let mut segs: Vec<&str> = s.split("::").collect();
    let base: Id = segs.pop().expect("split always yields at least one element").parse()?;
    let namespace = segs.into_iter().map(str::parse).collect::<Result<Vec<Id>, _>>()?;
    Ok(Path::new(base, namespace, None))
}

fn annotated<T>(data: T) -> Annotated<T> {
    Annotated {
        data,
        annotations: Default::default(),
    }
}

/// Builds a [`Schema`] one declaration at a time. `.namespace(...)` switches
/// which namespace subsequent declarations land in (creating it the first
/// time it's named); `.build()` consumes the builder.
pub struct SchemaBuilder {
    namespaces: Vec<(Option<Path>, Vec<Annotated<Node<Declaration>>>)>,
    current: usize,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            namespaces: vec![(None, Vec::new())],
            current: 0,
        }
    }

    /// Switches the active namespace, creating it if this is the first
    /// declaration in it. `None` is the top level, always present at index 0.
    pub fn namespace(mut self, name: Option<&str>) -> Result<Self, IdentParseError> {
        let path = name.map(path_from_str).transpose()?;
        let key = path.as_ref().map(Path::to_string);
        if let Some(idx) = self
            .namespaces
            .iter()
            .position(|(p, _)| p.as_ref().map(Path::to_string) == key)
        {
            self.current = idx;
        } else {
            self.namespaces.push((path, Vec::new()));
            self.current = self.namespaces.len() - 1;
        }
        Ok(self)
    }

    fn push(mut self, decl: Declaration) -> Self {
        self.namespaces[self.current].1.push(annotated(node(decl)));
        self
    }

    /// Adds `entity Name;` with no parents, attributes, or tags.
    pub fn entity(self, name: &str) -> Result<Self, IdentParseError> {
        self.entity_with(name, &[], Vec::new(), None)
    }

    /// Adds a standard entity type with the given `memberOf` parents,
    /// attributes, and an optional tag type.
    pub fn entity_with(
        self,
        name: &str,
        member_of: &[&str],
        attrs: Vec<(&str, bool, Type)>,
        tags: Option<Type>,
    ) -> Result<Self, IdentParseError> {
        let id: Id = name.parse()?;
        let member_of_types = member_of.iter().map(|p| path_from_str(p)).collect::<Result<Vec<_>, _>>()?;
        let attrs = if attrs.is_empty() {
            None
        } else {
            let decls: Vec<_> = attrs
                .into_iter()
                .map(|(name, required, ty)| {
                    node(annotated(crate::validator::cedar_schema::ast::AttrDecl {
                        name: node(SmolStr::from(name)),
                        required,
                        ty: node(ty),
                    }))
                })
                .collect();
            Some(node(decls))
        };
        let decl = EntityDecl::Standard(StandardEntityDecl {
            names: NonEmpty::new(node(id)),
            member_of_types,
            attrs,
            tags: tags.map(node),
        });
        Ok(self.push(Declaration::Entity(decl)))
    }

    /// Adds `entity Name enum ["a", "b"];`.
    pub fn enum_entity(self, name: &str, choices: &[&str]) -> Result<Self, IdentParseError> {
        let id: Id = name.parse()?;
        let decl = EntityDecl::Enum(EnumEntityDecl {
            names: NonEmpty::new(node(id)),
            choices: choices.iter().map(|c| node(SmolStr::from(*c))).collect(),
        });
        Ok(self.push(Declaration::Entity(decl)))
    }

    /// Adds `type Name = def;`.
    pub fn common_type(self, name: &str, def: Type) -> Result<Self, IdentParseError> {
        let id: Id = name.parse()?;
        let decl = crate::validator::cedar_schema::ast::TypeDecl {
            name: node(id),
            def: node(def),
        };
        Ok(self.push(Declaration::Type(decl)))
    }

    /// Adds an action with no parents or `appliesTo`.
    pub fn action(self, name: &str) -> Result<Self, IdentParseError> {
        self.action_with(name, &[], None, None, None)
    }

    /// Adds an action. `parents` is a list of `(eid, type)` pairs for
    /// `memberOf`; `type: None` means an unqualified `EntityUID` reference.
    /// `principal_types`/`resource_types`: `None` means that `PR` clause is
    /// omitted from `appliesTo` entirely (unconstrained), matching the
    /// [`PRAppDecl::entity_tys`](crate::validator::cedar_schema::ast::PRAppDecl)
    /// absent-vs-empty distinction.
    #[allow(clippy::too_many_arguments)]
    pub fn action_with(
        self,
        name: &str,
        parents: &[(&str, Option<&str>)],
        principal_types: Option<&[&str]>,
        resource_types: Option<&[&str]>,
        context: Option<Type>,
    ) -> Result<Self, IdentParseError> {
        let parents = if parents.is_empty() {
            None
        } else {
            let qns = parents
                .iter()
                .map(|(eid, ty)| -> Result<_, IdentParseError> {
                    let path = ty.map(path_from_str).transpose()?;
                    Ok(node(QualName {
                        path,
                        eid: SmolStr::from(*eid),
                    }))
                })
                .collect::<Result<Vec<_>, _>>()?;
            NonEmpty::from_vec(qns)
        };
        let mut app_items = Vec::new();
        if let Some(tys) = principal_types {
            app_items.push(node(AppDecl::PR(PRAppDecl {
                kind: node(PR::Principal),
                entity_tys: tys.iter().map(|p| path_from_str(p)).collect::<Result<Vec<_>, _>>()?,
            })));
        }
        if let Some(tys) = resource_types {
            app_items.push(node(AppDecl::PR(PRAppDecl {
                kind: node(PR::Resource),
                entity_tys: tys.iter().map(|p| path_from_str(p)).collect::<Result<Vec<_>, _>>()?,
            })));
        }
        if let Some(Type::Record(fields)) = context {
            if !fields.is_empty() {
                app_items.push(node(AppDecl::Context(either::Either::Right(node(fields)))));
            }
        }
        let app_decls = NonEmpty::from_vec(app_items).map(node);
        let decl = ActionDecl {
            names: NonEmpty::new(node(SmolStr::from(name))),
            parents,
            app_decls,
        };
        Ok(self.push(Declaration::Action(decl)))
    }

    pub fn build(self) -> Schema {
        self.namespaces
            .into_iter()
            .map(|(name, decls)| annotated(Namespace { name, decls, loc: None }))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_a_minimal_schema() {
        let schema = SchemaBuilder::new()
            .entity("User")
            .unwrap()
            .entity_with("Photo", &["User"], Vec::new(), None)
            .unwrap()
            .action_with("view", &[], Some(&["User"]), Some(&["Photo"]), None)
            .unwrap()
            .build();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema[0].data.decls.len(), 3);
    }

    #[test]
    fn namespace_switches_target() {
        let schema = SchemaBuilder::new()
            .entity("Top")
            .unwrap()
            .namespace(Some("NS"))
            .unwrap()
            .entity("Nested")
            .unwrap()
            .build();
        assert_eq!(schema.len(), 2);
        assert!(schema[0].data.name.is_none());
        assert_eq!(schema[1].data.name.as_ref().unwrap().to_string(), "NS");
    }

    #[test]
    fn resolves_like_the_equivalent_text() {
        let built = SchemaBuilder::new()
            .entity("User")
            .unwrap()
            .entity("Photo")
            .unwrap()
            .action_with("view", &[], Some(&["User"]), Some(&["Photo"]), None)
            .unwrap()
            .build();
        let parsed = crate::validator::cedar_schema::parse_schema(
            b"entity User; entity Photo; action view appliesTo { principal: [User], resource: [Photo] };",
            None,
        )
        .unwrap();
        assert_eq!(crate::validator::resolve(&built).unwrap(), crate::validator::resolve(&parsed).unwrap());
    }
}
