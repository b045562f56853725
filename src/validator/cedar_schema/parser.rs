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

//! Recursive-descent parser for the human-readable Cedar schema syntax
//! (spec.md §4.2). Consumes the [`crate::scanner`]'s token stream and
//! produces an [`ast::Schema`], or the first syntax/duplicate-key error.

use std::collections::HashSet;
use std::sync::Arc;

use either::Either;
use nonempty::NonEmpty;
use smol_str::SmolStr;

use crate::ast::{build_annotations, AnyId, Id};
use crate::parser::{MaybeLoc, Node};
use crate::scanner::{Scanner, Token, TokenKind};

use super::ast::{
    Annotated, AppDecl, ActionDecl, AttrDecl, Declaration, EntityDecl, EnumEntityDecl, Namespace,
    PRAppDecl, Path, QualName, Schema, StandardEntityDecl, Type, TypeDecl, PR,
};
use super::err::{CedarParseError, DuplicateKeyError, SyntaxError};

type PResult<T> = Result<T, CedarParseError>;

/// Parse a full schema document, producing the [`Schema`] AST.
pub fn parse_schema(bytes: &[u8], filename: Option<Arc<str>>) -> PResult<Schema> {
    let tokens = Scanner::new(bytes, filename)?.tokenize()?;
    let mut p = Parser::new(&tokens);
    let schema = p.schema()?;
    p.expect_eof()?;
    Ok(schema)
}

struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, idx: 0 }
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.idx]
    }

    fn loc(&self) -> MaybeLoc {
        self.cur().loc.clone()
    }

    fn is_eof(&self) -> bool {
        self.cur().kind == TokenKind::Eof
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.idx].clone();
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        t
    }

    fn at_op(&self, s: &str) -> bool {
        self.cur().kind == TokenKind::Op && self.cur().text == s
    }

    fn at_ident(&self, s: &str) -> bool {
        self.cur().kind == TokenKind::Ident && self.cur().text == s
    }

    fn at_ident_any(&self) -> bool {
        self.cur().kind == TokenKind::Ident
    }

    fn unexpected(&self, expected: impl Into<String>) -> CedarParseError {
        let t = self.cur();
        if t.kind == TokenKind::Eof {
            SyntaxError::UnexpectedEof {
                expected: expected.into(),
                loc: self.loc(),
            }
            .into()
        } else {
            SyntaxError::UnexpectedToken {
                found: t.text.clone(),
                expected: expected.into(),
                loc: self.loc(),
            }
            .into()
        }
    }

    fn eat_op(&mut self, s: &str) -> PResult<Token> {
        if self.at_op(s) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(format!("`{s}`")))
        }
    }

    fn eat_ident_kw(&mut self, s: &str) -> PResult<Token> {
        if self.at_ident(s) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(format!("`{s}`")))
        }
    }

    /// Consume any identifier-shaped token and parse it as an [`Id`],
    /// rejecting the reserved word `in`.
    fn eat_id(&mut self) -> PResult<Node<Id>> {
        if !self.at_ident_any() {
            return Err(self.unexpected("an identifier"));
        }
        let t = self.bump();
        if t.text == "in" {
            return Err(SyntaxError::ReservedIdentifier { loc: t.loc }.into());
        }
        let id: Id = t.text.parse().expect("scanner only emits valid identifier text");
        Ok(Node::with_maybe_source_loc(id, t.loc))
    }

    /// Consume any identifier-shaped token, allowing `in` and every
    /// contextual keyword (used for annotation keys).
    fn eat_any_id(&mut self) -> PResult<Node<AnyId>> {
        if !self.at_ident_any() {
            return Err(self.unexpected("an identifier"));
        }
        let t = self.bump();
        Ok(Node::with_maybe_source_loc(
            AnyId::new_unchecked(t.text),
            t.loc,
        ))
    }

    fn eat_string(&mut self) -> PResult<Node<SmolStr>> {
        if self.cur().kind != TokenKind::Str {
            return Err(self.unexpected("a string literal"));
        }
        let t = self.bump();
        Ok(Node::with_maybe_source_loc(t.text, t.loc))
    }

    fn expect_eof(&mut self) -> PResult<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    // Schema := (Annotation* Declaration)*
    fn schema(&mut self) -> PResult<Schema> {
        let mut namespaces: Vec<Annotated<Namespace>> = Vec::new();
        let mut top_level: Vec<Annotated<Node<Declaration>>> = Vec::new();
        let mut seen_ns_names: HashSet<SmolStr> = HashSet::new();

        while !self.is_eof() {
            let raw_annotations = self.annotations()?;
            if self.at_ident("namespace") {
                let ns = self.namespace_decl(raw_annotations)?;
                let key: SmolStr = ns.data.name.as_ref().map(|p| p.to_string().into()).unwrap_or_default();
                if !seen_ns_names.insert(key.clone()) {
                    return Err(DuplicateKeyError::Namespace {
                        name: key,
                        loc: ns.data.loc.clone(),
                    }
                    .into());
                }
                namespaces.push(ns);
            } else {
                let annotations = build_annotations(raw_annotations)?;
                let decl = self.declaration()?;
                top_level.push(Annotated {
                    data: decl,
                    annotations,
                });
            }
        }

        check_container_duplicates(&top_level)?;
        let mut result = vec![Annotated {
            data: Namespace {
                name: None,
                decls: top_level,
                loc: None,
            },
            annotations: Default::default(),
        }];
        result.extend(namespaces);
        Ok(result)
    }

    fn annotations(&mut self) -> PResult<Vec<Node<(Node<AnyId>, Option<Node<SmolStr>>)>>> {
        let mut out = Vec::new();
        while self.at_op("@") {
            let start = self.loc();
            self.bump();
            let key = self.eat_any_id()?;
            let value = if self.at_op("(") {
                self.bump();
                let v = self.eat_string()?;
                self.eat_op(")")?;
                Some(v)
            } else {
                None
            };
            out.push(Node::with_maybe_source_loc((key, value), start));
        }
        Ok(out)
    }

    fn namespace_decl(&mut self, raw_annotations: Vec<Node<(Node<AnyId>, Option<Node<SmolStr>>)>>) -> PResult<Annotated<Namespace>> {
        let annotations = build_annotations(raw_annotations)?;
        let start = self.loc();
        self.eat_ident_kw("namespace")?;
        let path = self.path()?;
        self.eat_op("{")?;
        let mut decls: Vec<Annotated<Node<Declaration>>> = Vec::new();
        while !self.at_op("}") {
            if self.is_eof() {
                return Err(SyntaxError::UnmatchedBrace('{', start).into());
            }
            let raw = self.annotations()?;
            let decl_annotations = build_annotations(raw)?;
            let decl = self.declaration()?;
            decls.push(Annotated {
                data: decl,
                annotations: decl_annotations,
            });
        }
        self.eat_op("}")?;
        check_container_duplicates(&decls)?;
        Ok(Annotated {
            data: Namespace {
                name: Some(path),
                decls,
                loc: start,
            },
            annotations,
        })
    }

    // Declaration := Entity | Action | CommonType
    fn declaration(&mut self) -> PResult<Node<Declaration>> {
        let start = self.loc();
        if self.at_ident("entity") {
            let d = self.entity_decl()?;
            Ok(Node::with_maybe_source_loc(Declaration::Entity(d), start))
        } else if self.at_ident("action") {
            let d = self.action_decl()?;
            Ok(Node::with_maybe_source_loc(Declaration::Action(d), start))
        } else if self.at_ident("type") {
            let d = self.common_type_decl()?;
            Ok(Node::with_maybe_source_loc(Declaration::Type(d), start))
        } else if self.cur().kind == TokenKind::Op && self.cur().text == ";" {
            Err(SyntaxError::EmptyStatement { loc: self.loc() }.into())
        } else {
            Err(self.unexpected("`entity`, `action`, `type`, or `namespace`"))
        }
    }

    // Entity := "entity" IdentList (EnumTail | EntityBody) ";"
    fn entity_decl(&mut self) -> PResult<EntityDecl> {
        self.eat_ident_kw("entity")?;
        let names = self.ident_list()?;
        if self.at_ident("enum") {
            if names.len() > 1 {
                return Err(SyntaxError::EnumCannotBeCommaHeaded { loc: self.loc() }.into());
            }
            self.bump();
            self.eat_op("[")?;
            let choices = self.string_list()?;
            self.eat_op("]")?;
            self.eat_op(";")?;
            Ok(EntityDecl::Enum(EnumEntityDecl {
                names: NonEmpty::from_vec(names).expect("ident_list is non-empty"),
                choices,
            }))
        } else {
            let member_of_types = if self.at_ident("in") {
                self.bump();
                self.entity_type_refs()?
            } else {
                Vec::new()
            };
            let attrs_start = self.loc();
            let attrs = if self.at_op("=") {
                self.bump();
                Some(self.record()?)
            } else if self.at_op("{") {
                Some(self.record()?)
            } else {
                None
            };
            if let Some(fields) = &attrs {
                check_duplicate_attrs(fields)?;
            }
            let tags = if self.at_ident("tags") {
                self.bump();
                Some(self.ty()?)
            } else {
                None
            };
            self.eat_op(";")?;
            Ok(EntityDecl::Standard(StandardEntityDecl {
                names: NonEmpty::from_vec(names).expect("ident_list is non-empty"),
                member_of_types,
                attrs: attrs.map(|fields| Node::with_maybe_source_loc(fields, attrs_start)),
                tags,
            }))
        }
    }

    /// `Ident ("," Ident)*`, rejecting leading/doubled/bare-trailing commas.
    fn ident_list(&mut self) -> PResult<Vec<Node<Id>>> {
        if self.at_op(",") {
            return Err(SyntaxError::LeadingComma { loc: self.loc() }.into());
        }
        let mut out = vec![self.eat_id()?];
        while self.at_op(",") {
            let comma_loc = self.loc();
            self.bump();
            if self.at_op(",") {
                return Err(SyntaxError::DoubledComma { loc: comma_loc }.into());
            }
            if !self.at_ident_any() {
                return Err(SyntaxError::TrailingComma { loc: comma_loc }.into());
            }
            out.push(self.eat_id()?);
        }
        Ok(out)
    }

    fn string_list(&mut self) -> PResult<Vec<Node<SmolStr>>> {
        let mut out = Vec::new();
        if self.cur().kind == TokenKind::Str {
            out.push(self.eat_string()?);
            while self.at_op(",") {
                self.bump();
                if self.cur().kind != TokenKind::Str {
                    break; // trailing comma before `]`, allowed inside a list
                }
                out.push(self.eat_string()?);
            }
        }
        Ok(out)
    }

    // EntityTypeRefs := Path | "[" (Path ("," Path)* ","?)? "]"
    fn entity_type_refs(&mut self) -> PResult<Vec<Path>> {
        if self.at_op("[") {
            self.bump();
            let mut out = Vec::new();
            while !self.at_op("]") {
                out.push(self.path()?);
                if self.at_op(",") {
                    self.bump();
                } else {
                    break;
                }
            }
            self.eat_op("]")?;
            Ok(out)
        } else {
            Ok(vec![self.path()?])
        }
    }

    // Path := Ident ("::" Ident)*
    fn path(&mut self) -> PResult<Path> {
        let start = self.loc();
        let first = self.eat_id()?;
        let mut namespace = Vec::new();
        let mut basename = first;
        while self.at_op("::") {
            self.bump();
            let next = self.eat_id()?;
            namespace.push(basename.node);
            basename = next;
        }
        Ok(Path::new(basename.node, namespace, start))
    }

    // Record := "{" (Annotation* RecordField ("," Annotation* RecordField)* ","?)? "}"
    fn record(&mut self) -> PResult<Vec<Node<Annotated<AttrDecl>>>> {
        let open = self.loc();
        self.eat_op("{")?;
        let mut fields = Vec::new();
        while !self.at_op("}") {
            if self.is_eof() {
                return Err(SyntaxError::UnmatchedBrace('{', open).into());
            }
            let raw_annotations = self.annotations()?;
            let annotations = build_annotations(raw_annotations)?;
            let field = self.record_field()?;
            fields.push(field.map(|data| Annotated { data, annotations }));
            if self.at_op(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.eat_op("}")?;
        Ok(fields)
    }

    // RecordField := (Ident | String) "?"? ":" Type
    fn record_field(&mut self) -> PResult<Node<AttrDecl>> {
        let start = self.loc();
        let name = if self.cur().kind == TokenKind::Str {
            self.eat_string()?
        } else {
            let id = self.eat_id()?;
            id.map(|i| SmolStr::new(i.as_ref()))
        };
        let required = if self.at_op("?") {
            self.bump();
            false
        } else {
            true
        };
        self.eat_op(":")?;
        let ty = self.ty()?;
        Ok(Node::with_maybe_source_loc(
            AttrDecl { name, required, ty },
            start,
        ))
    }

    // Type := "Set" "<" Type ">" | Record | Path
    fn ty(&mut self) -> PResult<Node<Type>> {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.ty_inner())
    }

    fn ty_inner(&mut self) -> PResult<Node<Type>> {
        let start = self.loc();
        if self.at_ident("Set") {
            self.bump();
            self.eat_op("<")?;
            let inner = self.ty()?;
            self.eat_op(">")?;
            Ok(Node::with_maybe_source_loc(Type::Set(Box::new(inner)), start))
        } else if self.at_op("{") {
            let fields = self.record()?;
            check_duplicate_attrs(&fields)?;
            Ok(Node::with_maybe_source_loc(Type::Record(fields), start))
        } else {
            let path = self.path()?;
            Ok(Node::with_maybe_source_loc(Type::Ident(path), start))
        }
    }

    // CommonType := "type" Ident "=" Type ";"
    fn common_type_decl(&mut self) -> PResult<TypeDecl> {
        self.eat_ident_kw("type")?;
        let name = self.eat_id()?;
        self.eat_op("=")?;
        let def = self.ty()?;
        self.eat_op(";")?;
        Ok(TypeDecl { name, def })
    }

    // Action := "action" ActionNameList ("in" EntityRefs)? ("appliesTo" "{" .. "}")? ";"
    fn action_decl(&mut self) -> PResult<ActionDecl> {
        self.eat_ident_kw("action")?;
        let names = self.action_name_list()?;
        let parents = if self.at_ident("in") {
            self.bump();
            Some(self.entity_refs()?)
        } else {
            None
        };
        let app_decls = if self.at_ident("appliesTo") {
            let start = self.loc();
            self.bump();
            self.eat_op("{")?;
            let decls = self.applies_to_fields()?;
            self.eat_op("}")?;
            Some(Node::with_maybe_source_loc(decls, start))
        } else {
            None
        };
        self.eat_op(";")?;
        Ok(ActionDecl {
            names: NonEmpty::from_vec(names).expect("action_name_list is non-empty"),
            parents,
            app_decls,
        })
    }

    fn action_name_list(&mut self) -> PResult<Vec<Node<SmolStr>>> {
        if self.at_op(",") {
            return Err(SyntaxError::LeadingComma { loc: self.loc() }.into());
        }
        let mut out = vec![self.action_name()?];
        while self.at_op(",") {
            let comma_loc = self.loc();
            self.bump();
            if self.at_op(",") {
                return Err(SyntaxError::DoubledComma { loc: comma_loc }.into());
            }
            if !(self.cur().kind == TokenKind::Str || self.at_ident_any()) {
                return Err(SyntaxError::TrailingComma { loc: comma_loc }.into());
            }
            out.push(self.action_name()?);
        }
        Ok(out)
    }

    /// An action name is a string literal or a bare identifier (treated as
    /// its text, consistent with an action's identity being a `String`, not
    /// an `Ident`, per spec.md §3).
    fn action_name(&mut self) -> PResult<Node<SmolStr>> {
        if self.cur().kind == TokenKind::Str {
            self.eat_string()
        } else if self.at_ident_any() {
            let t = self.bump();
            Ok(Node::with_maybe_source_loc(t.text, t.loc))
        } else {
            Err(self.unexpected("an action name"))
        }
    }

    // EntityRef := String | Ident ("::" Ident)* ("::" String)?
    fn entity_ref(&mut self) -> PResult<Node<QualName>> {
        let start = self.loc();
        if self.cur().kind == TokenKind::Str {
            let s = self.eat_string()?;
            return Ok(Node::with_maybe_source_loc(QualName::unqualified(s.node), start));
        }
        let first = self.eat_id()?;
        let mut namespace = Vec::new();
        let mut basename = first;
        loop {
            if self.at_op("::") {
                self.bump();
                if self.cur().kind == TokenKind::Str {
                    let eid = self.eat_string()?;
                    let path = Path::new(basename.node, namespace, start.clone());
                    return Ok(Node::with_maybe_source_loc(
                        QualName::qualified(path, eid.node),
                        start,
                    ));
                }
                let next = self.eat_id()?;
                namespace.push(basename.node);
                basename = next;
            } else {
                return Err(self.unexpected("`::\"id\"`"));
            }
        }
    }

    fn entity_refs(&mut self) -> PResult<NonEmpty<Node<QualName>>> {
        if self.at_op("[") {
            self.bump();
            let mut out = Vec::new();
            while !self.at_op("]") {
                out.push(self.entity_ref()?);
                if self.at_op(",") {
                    self.bump();
                } else {
                    break;
                }
            }
            self.eat_op("]")?;
            NonEmpty::from_vec(out).ok_or_else(|| self.unexpected("at least one entity reference"))
        } else {
            Ok(NonEmpty::new(self.entity_ref()?))
        }
    }

    fn applies_to_fields(&mut self) -> PResult<NonEmpty<Node<AppDecl>>> {
        let mut out = Vec::new();
        let mut seen_principal = false;
        let mut seen_resource = false;
        let mut seen_context = false;
        loop {
            if self.at_op("}") || self.is_eof() {
                break;
            }
            let start = self.loc();
            if self.at_ident("principal") {
                if seen_principal {
                    return Err(SyntaxError::DuplicateAppliesToField {
                        field: "principal",
                        loc: start,
                    }
                    .into());
                }
                seen_principal = true;
                self.bump();
                self.eat_op(":")?;
                let tys = self.entity_type_refs_nonempty()?;
                out.push(Node::with_maybe_source_loc(
                    AppDecl::PR(PRAppDecl {
                        kind: Node::with_maybe_source_loc(PR::Principal, start.clone()),
                        entity_tys: tys.into(),
                    }),
                    start,
                ));
            } else if self.at_ident("resource") {
                if seen_resource {
                    return Err(SyntaxError::DuplicateAppliesToField {
                        field: "resource",
                        loc: start,
                    }
                    .into());
                }
                seen_resource = true;
                self.bump();
                self.eat_op(":")?;
                let tys = self.entity_type_refs_nonempty()?;
                out.push(Node::with_maybe_source_loc(
                    AppDecl::PR(PRAppDecl {
                        kind: Node::with_maybe_source_loc(PR::Resource, start.clone()),
                        entity_tys: tys.into(),
                    }),
                    start,
                ));
            } else if self.at_ident("context") {
                if seen_context {
                    return Err(SyntaxError::DuplicateAppliesToField {
                        field: "context",
                        loc: start,
                    }
                    .into());
                }
                seen_context = true;
                self.bump();
                self.eat_op(":")?;
                let ctx = if self.at_op("{") {
                    let fields = self.record()?;
                    check_duplicate_attrs(&fields)?;
                    Either::Right(Node::with_maybe_source_loc(fields, start.clone()))
                } else {
                    Either::Left(self.path()?)
                };
                out.push(Node::with_maybe_source_loc(AppDecl::Context(ctx), start));
            } else {
                return Err(self.unexpected("`principal`, `resource`, or `context`"));
            }
            if self.at_op(",") {
                self.bump();
            } else {
                break;
            }
        }
        NonEmpty::from_vec(out).ok_or_else(|| self.unexpected("at least one `appliesTo` field"))
    }

    fn entity_type_refs_nonempty(&mut self) -> PResult<NonEmpty<Path>> {
        let v = self.entity_type_refs()?;
        NonEmpty::from_vec(v).ok_or_else(|| self.unexpected("at least one entity type"))
    }
}

fn check_duplicate_attrs(fields: &[Node<Annotated<AttrDecl>>]) -> PResult<()> {
    let mut seen: HashSet<SmolStr> = HashSet::new();
    for f in fields {
        if !seen.insert(f.node.data.name.node.clone()) {
            return Err(DuplicateKeyError::Attribute {
                name: f.node.data.name.node.clone(),
                loc: f.node.data.name.loc.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Enforce spec.md §4.2's per-container duplicate-key rules: unique entity,
/// action, and common-type names, with entities and enums sharing one
/// namespace.
fn check_container_duplicates(decls: &[Annotated<Node<Declaration>>]) -> PResult<()> {
    let mut entity_like: HashSet<SmolStr> = HashSet::new();
    let mut actions: HashSet<SmolStr> = HashSet::new();
    let mut common_types: HashSet<SmolStr> = HashSet::new();

    for decl in decls {
        match &decl.data.node {
            Declaration::Entity(e) => {
                for n in e.names() {
                    let text: SmolStr = n.node.as_ref().into();
                    if !entity_like.insert(text.clone()) {
                        return Err(DuplicateKeyError::EntityEnumCollision {
                            name: text,
                            loc: n.loc.clone(),
                        }
                        .into());
                    }
                }
            }
            Declaration::Action(a) => {
                for n in &a.names {
                    if !actions.insert(n.node.clone()) {
                        return Err(DuplicateKeyError::Action {
                            name: n.node.clone(),
                            loc: n.loc.clone(),
                        }
                        .into());
                    }
                }
            }
            Declaration::Type(t) => {
                let text: SmolStr = t.name.node.as_ref().into();
                if !common_types.insert(text.clone()) {
                    return Err(DuplicateKeyError::CommonType {
                        name: text,
                        loc: t.name.loc.clone(),
                    }
                    .into());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(src: &str) -> PResult<Schema> {
        parse_schema(src.as_bytes(), None)
    }

    #[test]
    fn s1_single_entity() {
        let schema = parse("entity User;").unwrap();
        let top = &schema[0];
        assert_eq!(top.data.decls.len(), 1);
        match &top.data.decls[0].data.node {
            Declaration::Entity(EntityDecl::Standard(d)) => {
                assert_eq!(d.names.len(), 1);
                assert!(d.member_of_types.is_empty());
                assert!(d.attrs.is_none());
                assert!(d.tags.is_none());
            }
            _ => panic!("expected standard entity"),
        }
    }

    #[test]
    fn s2_comma_headed_entities_with_shape_and_tags() {
        let schema = parse(
            "entity User, Admin in [Group] { name: String } tags Long; entity Group;",
        )
        .unwrap();
        let decls = &schema[0].data.decls;
        assert_eq!(decls.len(), 2);
        match &decls[0].data.node {
            Declaration::Entity(EntityDecl::Standard(d)) => {
                assert_eq!(d.names.len(), 2);
                assert_eq!(d.member_of_types.len(), 1);
                assert_eq!(d.attrs.as_ref().unwrap().node.len(), 1);
                assert!(d.tags.is_some());
            }
            _ => panic!("expected standard entity"),
        }
    }

    #[test]
    fn s3_enum_then_duplicate_entity_is_error() {
        parse(r#"entity Status enum ["active","inactive"];"#).unwrap();
        let res = parse(r#"entity Status enum ["active","inactive"]; entity Status;"#);
        assert!(matches!(res, Err(CedarParseError::Duplicate(DuplicateKeyError::EntityEnumCollision { .. }))));
    }

    #[test]
    fn s4_action_in_bare_string() {
        let schema = parse(r#"action view in "readActions";"#).unwrap();
        match &schema[0].data.decls[0].data.node {
            Declaration::Action(a) => {
                let parents = a.parents.as_ref().unwrap();
                assert_eq!(parents.len(), 1);
                assert!(parents.head.node.path.is_none());
                assert_eq!(parents.head.node.eid, "readActions");
            }
            _ => panic!("expected action"),
        }
    }

    #[test]
    fn s5_duplicate_annotation_is_error() {
        parse(r#"@doc("A") entity User;"#).unwrap();
        let res = parse(r#"@doc("A") @doc("B") entity User;"#);
        assert!(matches!(res, Err(CedarParseError::Duplicate(DuplicateKeyError::Annotation { .. }))));
    }

    #[test]
    fn s6_malformed_inputs_error_not_panic() {
        assert!(parse("\"\"\"").is_err());
        assert!(parse("entity User in").is_err());
        assert!(parse_schema(b"\x00abc", None).is_err());
    }

    #[test]
    fn s7_self_referential_memberof() {
        let schema = parse("entity A in [A];").unwrap();
        match &schema[0].data.decls[0].data.node {
            Declaration::Entity(EntityDecl::Standard(d)) => {
                assert_eq!(d.member_of_types.len(), 1);
            }
            _ => panic!("expected standard entity"),
        }
    }

    #[test]
    fn s8_quoted_attribute_name() {
        let schema = parse(r#"entity U { "my-attr": String };"#).unwrap();
        match &schema[0].data.decls[0].data.node {
            Declaration::Entity(EntityDecl::Standard(d)) => {
                assert_eq!(d.attrs.as_ref().unwrap().node[0].node.data.name.node, "my-attr");
            }
            _ => panic!("expected standard entity"),
        }
    }

    #[test]
    fn entity_name_cannot_be_a_path() {
        let res = parse("entity A::B;");
        assert!(res.is_err());
    }

    #[test]
    fn enum_cannot_be_comma_headed() {
        let res = parse(r#"entity A, B enum ["x"];"#);
        assert!(matches!(res, Err(CedarParseError::Syntax(SyntaxError::EnumCannotBeCommaHeaded { .. }))));
    }

    #[test]
    fn namespace_wraps_declarations() {
        let schema = parse("namespace NS { entity User; }").unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema[1].data.name.is_some());
        assert_eq!(schema[1].data.decls.len(), 1);
    }

    #[test]
    fn applies_to_duplicate_field_errors() {
        let res = parse(
            r#"action view appliesTo { principal: [User], principal: [Admin] };"#,
        );
        assert!(matches!(
            res,
            Err(CedarParseError::Syntax(SyntaxError::DuplicateAppliesToField { .. }))
        ));
    }

    #[test]
    fn trailing_comma_in_record_is_allowed() {
        parse("entity U { a: String, };").unwrap();
    }

    #[test]
    fn trailing_comma_in_ident_list_is_rejected() {
        let res = parse("entity A, ;");
        assert!(matches!(res, Err(CedarParseError::Syntax(SyntaxError::TrailingComma { .. }))));
    }
}
