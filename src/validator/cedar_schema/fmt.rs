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

//! AST -> Cedar schema text. The inverse of [`super::parser`].
//!
//! Every name-keyed collection (common types, entities, enums, actions,
//! namespaces, record attributes, annotations) is re-sorted into lexicographic
//! key order on the way out, regardless of the order the AST holds it in: the
//! AST itself preserves insertion order (so the parser and the builder can
//! stay simple), and this module is the single place that imposes the
//! deterministic output order (spec.md §4.4).
//!
//! Comma-headed declarations (`entity A, B in [G] { .. };`) are flattened
//! into one statement per name. This keeps the per-name sort total: a third
//! entity whose name sorts between `A` and `B` would otherwise have nowhere
//! to go without breaking up the shared header.

use either::Either;

use crate::ast::{AnyId, Annotations, Id};

use super::ast::{
    ActionDecl, AppDecl, Annotated, AttrDecl, Declaration, EntityDecl, EnumEntityDecl, Namespace,
    Path, QualName, Schema, StandardEntityDecl, Type,
};

/// A schema that can't be rendered as Cedar text, because the AST holds a
/// state the text grammar has no syntax for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// JSON can say `"principalTypes": []` ("no principal type is ever
    /// allowed"); Cedar text's `principal: [...]` requires at least one
    /// entry (spec.md's `AppliesTo` grammar), so there's no text this can
    /// round-trip through.
    #[error("action `{action}` has an empty `{field}` entity-type list, which Cedar schema text cannot express")]
    EmptyTypeList { action: String, field: &'static str },
}

/// Emit a full schema as Cedar text.
pub fn emit_cedar(schema: &Schema) -> Result<String, EmitError> {
    let mut out = String::new();
    let top = schema.iter().find(|ns| ns.data.is_unqualified());
    let mut wrote_anything = false;
    if let Some(top) = top {
        wrote_anything |= emit_namespace_body(&mut out, &top.data, 0)?;
    }

    let mut namespaces: Vec<&Annotated<Namespace>> =
        schema.iter().filter(|ns| !ns.data.is_unqualified()).collect();
    namespaces.sort_by(|a, b| namespace_key(a).cmp(&namespace_key(b)));

    for ns in namespaces {
        if wrote_anything {
            out.push('\n');
        }
        wrote_anything = true;
        emit_annotations(&mut out, &ns.annotations, 0);
        out.push_str("namespace ");
        out.push_str(&ns.data.name.as_ref().expect("filtered to named namespaces").to_string());
        out.push_str(" {\n");
        emit_namespace_body(&mut out, &ns.data, 1)?;
        out.push_str("}\n");
    }
    Ok(out)
}

fn namespace_key(ns: &Annotated<Namespace>) -> String {
    ns.data.name.as_ref().map(|p| p.to_string()).unwrap_or_default()
}

/// Emits one namespace's declarations (types, then entities, then enums,
/// then actions, each lexicographically sorted and blank-line separated).
/// Returns whether anything was written, so the caller can decide whether a
/// leading blank line is needed before the next namespace.
fn emit_namespace_body(out: &mut String, ns: &Namespace, lvl: usize) -> Result<bool, EmitError> {
    let mut types = Vec::new();
    let mut standards = Vec::new();
    let mut enums = Vec::new();
    let mut actions = Vec::new();

    for decl in &ns.decls {
        match &decl.data.node {
            Declaration::Type(t) => types.push((&t.name.node, t, &decl.annotations)),
            Declaration::Entity(EntityDecl::Standard(d)) => {
                for n in &d.names {
                    standards.push((&n.node, d, &decl.annotations));
                }
            }
            Declaration::Entity(EntityDecl::Enum(d)) => {
                for n in &d.names {
                    enums.push((&n.node, d, &decl.annotations));
                }
            }
            Declaration::Action(a) => {
                for n in &a.names {
                    actions.push((&n.node, a, &decl.annotations));
                }
            }
        }
    }
    types.sort_by(|a, b| a.0.cmp(b.0));
    standards.sort_by(|a, b| a.0.cmp(b.0));
    enums.sort_by(|a, b| a.0.cmp(b.0));
    actions.sort_by(|a, b| a.0.cmp(b.0));

    let mut wrote = false;
    for (name, t, ann) in &types {
        blank_before(out, &mut wrote);
        emit_annotations(out, ann, lvl);
        out.push_str(&indent(lvl));
        out.push_str("type ");
        out.push_str(&name.to_string());
        out.push_str(" = ");
        emit_type(out, &t.def.node, lvl);
        out.push_str(";\n");
    }
    for (name, d, ann) in &standards {
        blank_before(out, &mut wrote);
        emit_entity_decl(out, lvl, name, d, ann);
    }
    for (name, d, ann) in &enums {
        blank_before(out, &mut wrote);
        emit_enum_decl(out, lvl, name, d, ann);
    }
    for (name, d, ann) in &actions {
        blank_before(out, &mut wrote);
        emit_action_decl(out, lvl, name, d, ann)?;
    }
    Ok(wrote)
}

fn blank_before(out: &mut String, wrote: &mut bool) {
    if *wrote {
        out.push('\n');
    }
    *wrote = true;
}

fn indent(lvl: usize) -> String {
    "  ".repeat(lvl)
}

fn emit_annotations(out: &mut String, ann: &Annotations, lvl: usize) {
    let mut pairs: Vec<(&AnyId, &crate::ast::Annotation)> = ann.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, annotation) in pairs {
        out.push_str(&indent(lvl));
        out.push('@');
        out.push_str(&key.to_string());
        if let Some(v) = &annotation.value {
            out.push('(');
            out.push_str(&escape_string(v));
            out.push(')');
        }
        out.push('\n');
    }
}

fn emit_entity_decl(out: &mut String, lvl: usize, name: &Id, d: &StandardEntityDecl, ann: &Annotations) {
    emit_annotations(out, ann, lvl);
    out.push_str(&indent(lvl));
    out.push_str("entity ");
    out.push_str(&name.to_string());
    if !d.member_of_types.is_empty() {
        out.push_str(" in ");
        emit_bracketed_paths(out, &d.member_of_types);
    }
    if let Some(attrs) = &d.attrs {
        out.push_str(" = ");
        emit_record(out, &attrs.node, lvl);
    }
    if let Some(tags) = &d.tags {
        out.push_str(" tags ");
        emit_type(out, &tags.node, lvl);
    }
    out.push_str(";\n");
}

fn emit_enum_decl(out: &mut String, lvl: usize, name: &Id, d: &EnumEntityDecl, ann: &Annotations) {
    emit_annotations(out, ann, lvl);
    out.push_str(&indent(lvl));
    out.push_str("entity ");
    out.push_str(&name.to_string());
    out.push_str(" enum [");
    let parts: Vec<String> = d.choices.iter().map(|c| escape_string(&c.node)).collect();
    out.push_str(&parts.join(", "));
    out.push_str("];\n");
}

fn emit_action_decl(
    out: &mut String,
    lvl: usize,
    name: &smol_str::SmolStr,
    d: &ActionDecl,
    ann: &Annotations,
) -> Result<(), EmitError> {
    emit_annotations(out, ann, lvl);
    out.push_str(&indent(lvl));
    out.push_str("action ");
    out.push_str(&emit_key(name));
    if let Some(parents) = &d.parents {
        out.push_str(" in ");
        out.push_str(&emit_entity_refs(parents));
    }
    if let Some(app) = &d.app_decls {
        let (principal, resource, context) = split_app_decls(&app.node);
        out.push_str(" appliesTo {\n");
        if let Some(tys) = principal {
            let rendered = emit_path_list(tys).ok_or_else(|| EmitError::EmptyTypeList {
                action: name.to_string(),
                field: "principal",
            })?;
            out.push_str(&indent(lvl + 1));
            out.push_str("principal: ");
            out.push_str(&rendered);
            out.push_str(",\n");
        }
        if let Some(tys) = resource {
            let rendered = emit_path_list(tys).ok_or_else(|| EmitError::EmptyTypeList {
                action: name.to_string(),
                field: "resource",
            })?;
            out.push_str(&indent(lvl + 1));
            out.push_str("resource: ");
            out.push_str(&rendered);
            out.push_str(",\n");
        }
        if let Some(ctx) = context {
            out.push_str(&indent(lvl + 1));
            out.push_str("context: ");
            match ctx {
                Either::Left(path) => out.push_str(&path.to_string()),
                Either::Right(fields) => emit_record(out, &fields.node, lvl + 1),
            }
            out.push_str(",\n");
        }
        out.push_str(&indent(lvl));
        out.push('}');
    }
    out.push_str(";\n");
    Ok(())
}

type SplitAppDecls<'a> = (
    Option<&'a [Path]>,
    Option<&'a [Path]>,
    Option<&'a Either<Path, crate::parser::Node<Vec<crate::parser::Node<Annotated<AttrDecl>>>>>>,
);

/// `appliesTo` always renders `principal`, then `resource`, then `context` in
/// that fixed order, regardless of the order they were written in: unlike
/// the other declaration kinds this is a fixed triple, not an open-ended
/// name-keyed mapping, so there's no lexicographic order to impose.
fn split_app_decls(decls: &nonempty::NonEmpty<crate::parser::Node<AppDecl>>) -> SplitAppDecls<'_> {
    let mut principal = None;
    let mut resource = None;
    let mut context = None;
    for d in decls.iter() {
        match &d.node {
            AppDecl::PR(pr) => match pr.kind.node {
                super::ast::PR::Principal => principal = Some(pr.entity_tys.as_slice()),
                super::ast::PR::Resource => resource = Some(pr.entity_tys.as_slice()),
            },
            AppDecl::Context(ctx) => context = Some(ctx),
        }
    }
    (principal, resource, context)
}

/// `principal`/`resource` type constraints: single form for exactly one
/// type, bracketed for any other positive count (the same shape rule
/// spec.md §4.4 gives for action `memberOf`). `None` for an empty list —
/// only the JSON codec can produce "no type allowed", and there is no Cedar
/// text for it; the caller turns that into an [`EmitError`].
fn emit_path_list(tys: &[Path]) -> Option<String> {
    if tys.is_empty() {
        None
    } else if tys.len() == 1 {
        Some(tys[0].to_string())
    } else {
        let parts: Vec<String> = tys.iter().map(|p| p.to_string()).collect();
        Some(format!("[{}]", parts.join(", ")))
    }
}

fn emit_bracketed_paths(out: &mut String, paths: &[Path]) {
    let parts: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    out.push('[');
    out.push_str(&parts.join(", "));
    out.push(']');
}

fn emit_entity_refs(refs: &nonempty::NonEmpty<crate::parser::Node<QualName>>) -> String {
    if refs.len() == 1 {
        emit_qual_name(&refs.head.node)
    } else {
        let parts: Vec<String> = refs.iter().map(|n| emit_qual_name(&n.node)).collect();
        format!("[{}]", parts.join(", "))
    }
}

fn emit_qual_name(qn: &QualName) -> String {
    match &qn.path {
        None => escape_string(&qn.eid),
        Some(p) => format!("{p}::{}", escape_string(&qn.eid)),
    }
}

fn emit_type(out: &mut String, ty: &Type, lvl: usize) {
    match ty {
        Type::Set(inner) => {
            out.push_str("Set<");
            emit_type(out, &inner.node, lvl);
            out.push('>');
        }
        Type::Ident(path) => out.push_str(&path.to_string()),
        Type::Record(fields) => emit_record(out, fields, lvl),
    }
}

fn emit_record(out: &mut String, fields: &[crate::parser::Node<Annotated<AttrDecl>>], lvl: usize) {
    if fields.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    let mut sorted: Vec<&crate::parser::Node<Annotated<AttrDecl>>> = fields.iter().collect();
    sorted.sort_by(|a, b| a.node.data.name.node.cmp(&b.node.data.name.node));
    for f in sorted {
        emit_annotations(out, &f.node.annotations, lvl + 1);
        out.push_str(&indent(lvl + 1));
        out.push_str(&emit_key(&f.node.data.name.node));
        if !f.node.data.required {
            out.push('?');
        }
        out.push_str(": ");
        emit_type(out, &f.node.data.ty.node, lvl + 1);
        out.push_str(",\n");
    }
    out.push_str(&indent(lvl));
    out.push('}');
}

fn is_bare_ident(s: &str) -> bool {
    if s == "in" {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

fn emit_key(s: &str) -> String {
    if is_bare_ident(s) {
        s.to_string()
    } else {
        escape_string(s)
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || (c as u32) == 0x7f || (0x80..=0x9f).contains(&(c as u32)) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::validator::cedar_schema::parser::parse_schema;

    fn roundtrip(src: &str) -> String {
        let ast = parse_schema(src.as_bytes(), None).unwrap();
        emit_cedar(&ast).unwrap()
    }

    #[test]
    fn s1_single_entity() {
        assert_eq!(roundtrip("entity User;"), "entity User;\n");
    }

    #[test]
    fn s4_action_single_memberof_has_no_brackets() {
        assert_eq!(
            roundtrip(r#"action view in "readActions";"#),
            "action view in \"readActions\";\n"
        );
    }

    #[test]
    fn s8_quoted_attribute_name_round_trips() {
        let out = roundtrip(r#"entity U { "my-attr": String };"#);
        assert!(out.contains("\"my-attr\": String"));
        let reparsed = parse_schema(out.as_bytes(), None).unwrap();
        assert_eq!(emit_cedar(&reparsed).unwrap(), out);
    }

    #[test]
    fn comma_headed_entities_flatten_and_sort() {
        let out = roundtrip("entity Zebra, Apple in [Group] { n: String }; entity Group;");
        let apple_pos = out.find("entity Apple").unwrap();
        let group_pos = out.find("entity Group").unwrap();
        let zebra_pos = out.find("entity Zebra").unwrap();
        assert!(apple_pos < group_pos);
        assert!(group_pos < zebra_pos);
    }

    #[test]
    fn empty_shape_emits_equals_braces_but_absent_shape_does_not() {
        assert_eq!(roundtrip("entity A;"), "entity A;\n");
        assert_eq!(roundtrip("entity A {};"), "entity A = {};\n");
    }

    #[test]
    fn record_fields_sort_lexicographically() {
        let out = roundtrip("entity U { z: String, a: String };");
        let a_pos = out.find("a: String").unwrap();
        let z_pos = out.find("z: String").unwrap();
        assert!(a_pos < z_pos);
    }

    #[test]
    fn idempotent_after_first_emit() {
        let src = r#"
            namespace NS {
              @doc("users")
              entity User in [Group] { name: String, age?: Long } tags String;
              entity Group;
              entity Status enum ["active", "inactive"];
              action "view", "edit" in ["readActions"] appliesTo {
                principal: [User],
                resource: [Group],
                context: { ip: String }
              };
            }
        "#;
        let first = roundtrip(src);
        let reparsed = parse_schema(first.as_bytes(), None).unwrap();
        let second = emit_cedar(&reparsed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn namespace_blocks_sort_and_blank_separate() {
        let out = roundtrip("namespace Zeta { entity A; } namespace Alpha { entity B; }");
        let alpha_pos = out.find("namespace Alpha").unwrap();
        let zeta_pos = out.find("namespace Zeta").unwrap();
        assert!(alpha_pos < zeta_pos);
        assert!(out.contains("}\n\nnamespace"));
    }

    #[test]
    fn escapes_control_and_reserved_characters() {
        assert_eq!(escape_string("a\nb\"c"), "\"a\\nb\\\"c\"");
        assert_eq!(escape_string("\0"), "\"\\0\"");
        assert_eq!(escape_string("\u{7f}"), "\"\\x7f\"");
        assert_eq!(escape_string("\u{9f}"), "\"\\x9f\"");
    }

    #[test]
    fn bare_vs_quoted_attribute_keys() {
        assert_eq!(emit_key("name"), "name");
        assert_eq!(emit_key("in"), "\"in\"");
        assert_eq!(emit_key("my-attr"), "\"my-attr\"");
    }

    #[test]
    fn empty_principal_type_list_is_an_emit_error() {
        use super::super::ast::{PRAppDecl, PR};
        use crate::parser::Node;
        use nonempty::NonEmpty;

        let action = ActionDecl {
            names: NonEmpty::new(Node::with_maybe_source_loc(smol_str::SmolStr::from("view"), None)),
            parents: None,
            app_decls: Some(Node::with_maybe_source_loc(
                NonEmpty::new(Node::with_maybe_source_loc(
                    AppDecl::PR(PRAppDecl {
                        kind: Node::with_maybe_source_loc(PR::Principal, None),
                        entity_tys: vec![],
                    }),
                    None,
                )),
                None,
            )),
        };
        let ns = Annotated {
            data: Namespace {
                name: None,
                decls: vec![Annotated {
                    data: Node::with_maybe_source_loc(Declaration::Action(action), None),
                    annotations: Default::default(),
                }],
                loc: None,
            },
            annotations: Default::default(),
        };
        let err = emit_cedar(&vec![ns]).unwrap_err();
        assert!(matches!(err, EmitError::EmptyTypeList { field: "principal", .. }));
    }
}
