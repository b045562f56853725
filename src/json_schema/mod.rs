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

//! The JSON schema wire format: a set of `serde`-derived DTOs mirroring the
//! shape of a schema JSON document, plus conversions to and from the shared
//! [`cedar_schema::ast`](crate::validator::cedar_schema::ast) model. The DTOs
//! exist only at the serialization boundary — once parsed, a JSON schema and
//! a Cedar-text schema are the exact same `Schema` value (spec.md §4.3).

use std::collections::HashMap;

use either::Either;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use smol_str::{SmolStr, ToSmolStr};
use thiserror::Error;

use crate::ast::{build_annotations, AnyId, Annotations, Id, IdentParseError};
use crate::parser::Node;
use crate::validator::cedar_schema::ast::{
    ActionDecl, Annotated, AppDecl, AttrDecl, Declaration, EntityDecl, EnumEntityDecl, Namespace, Path, QualName,
    Schema, StandardEntityDecl, Type, TypeDecl, EXTENSION_TYPES, PR,
};

#[derive(Debug, Error)]
pub enum JsonSchemaError {
    #[error("invalid identifier `{0}` in JSON schema: {1}")]
    InvalidIdent(String, IdentParseError),
    #[error("entity type `{0}` has both `enum` and `memberOfTypes`/`shape`/`tags`")]
    EnumWithOtherFields(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaFragmentJson(
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")] pub HashMap<SmolStr, NamespaceDefinitionJson>,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde_as]
#[serde(deny_unknown_fields)]
pub struct NamespaceDefinitionJson {
    #[serde(default)]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    #[serde(rename = "commonTypes")]
    pub common_types: HashMap<SmolStr, SchemaTypeJson>,
    #[serde(default)]
    #[serde(rename = "entityTypes")]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    pub entity_types: HashMap<SmolStr, EntityTypeJson>,
    #[serde(default)]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    pub actions: HashMap<SmolStr, ActionTypeJson>,
    #[serde(default)]
    pub annotations: HashMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityTypeJson {
    #[serde(default)]
    #[serde(rename = "memberOfTypes")]
    pub member_of_types: Vec<SmolStr>,
    #[serde(default)]
    pub shape: Option<SchemaTypeJson>,
    #[serde(default)]
    pub tags: Option<SchemaTypeJson>,
    #[serde(default)]
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<SmolStr>>,
    #[serde(default)]
    pub annotations: HashMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionTypeJson {
    #[serde(default)]
    #[serde(rename = "appliesTo")]
    pub applies_to: Option<ApplySpecJson>,
    #[serde(default)]
    #[serde(rename = "memberOf")]
    pub member_of: Option<Vec<ActionEntityUidJson>>,
    #[serde(default)]
    pub annotations: HashMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplySpecJson {
    #[serde(default)]
    #[serde(rename = "principalTypes")]
    pub principal_types: Option<Vec<SmolStr>>,
    #[serde(default)]
    #[serde(rename = "resourceTypes")]
    pub resource_types: Option<Vec<SmolStr>>,
    /// `None` and `Some(empty record)` are equivalent ("empty context
    /// normalization"); we always parse/emit the normalized `None` form.
    #[serde(default)]
    pub context: Option<SchemaTypeJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntityUidJson {
    pub id: SmolStr,
    #[serde(rename = "type")]
    #[serde(default)]
    pub ty: Option<SmolStr>,
}

/// Either a structural type (`{"type": "Record", ...}`) or a bare reference
/// to a declared common type (`{"type": "SomeAlias"}`), which serde can only
/// tell apart by trying the tagged variants first (spinda-cedar's
/// `SchemaType`/`SchemaTypeVariant` split).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypeJson {
    Typed(SchemaTypeVariantJson),
    TypeDef {
        #[serde(rename = "type")]
        type_name: SmolStr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(deny_unknown_fields)]
pub enum SchemaTypeVariantJson {
    String,
    Long,
    Boolean,
    Set {
        element: Box<SchemaTypeJson>,
    },
    Record {
        #[serde(default)]
        #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
        attributes: HashMap<SmolStr, TypeOfAttributeJson>,
        #[serde(rename = "additionalAttributes")]
        #[serde(default)]
        additional_attributes: bool,
    },
    Entity {
        name: SmolStr,
    },
    /// A reference that could name either a declared entity type or a
    /// declared common type — resolved the same way a bare identifier in
    /// Cedar text is (spec.md §4.3, §4.5).
    EntityOrCommon {
        name: SmolStr,
    },
    Extension {
        name: SmolStr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOfAttributeJson {
    #[serde(flatten)]
    pub ty: SchemaTypeJson,
    #[serde(default = "required_default")]
    pub required: bool,
    #[serde(default)]
    pub annotations: HashMap<SmolStr, SmolStr>,
}

fn required_default() -> bool {
    true
}

fn parse_id(s: &str) -> Result<Id, JsonSchemaError> {
    s.parse().map_err(|e| JsonSchemaError::InvalidIdent(s.to_string(), e))
}

fn parse_any_id(s: &str) -> Result<AnyId, JsonSchemaError> {
    s.parse().map_err(|e| JsonSchemaError::InvalidIdent(s.to_string(), e))
}

/// JSON annotations are a flat `name -> string` map; a value-less `@name` in
/// Cedar text and an explicit `@name("")` are both indistinguishable from a
/// missing annotation's absence once round-tripped through this shape, so
/// both normalize to `""` here.
fn annotations_to_ast(anns: HashMap<SmolStr, SmolStr>) -> Result<Annotations, JsonSchemaError> {
    let mut items: Vec<(SmolStr, SmolStr)> = anns.into_iter().collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    let raw = items
        .into_iter()
        .map(|(k, v)| Ok(node((node(parse_any_id(&k)?), Some(node(v))))))
        .collect::<Result<Vec<_>, JsonSchemaError>>()?;
    Ok(build_annotations(raw).expect("keys from a HashMap are already unique"))
}

fn annotations_to_json(anns: &Annotations) -> HashMap<SmolStr, SmolStr> {
    anns.iter()
        .map(|(k, v)| (k.as_ref().into(), v.value.clone().unwrap_or_default()))
        .collect()
}

/// Splits `"NS::Sub::Name"` into a [`Path`]. A name with no `::` is a
/// single-segment path.
fn path_from_str(s: &str) -> Result<Path, JsonSchemaError> {
    let mut segs: Vec<&str> = s.split("::").collect();
    let base = segs.pop().expect("split always yields at least one element");
    let base = parse_id(base)?;
    let namespace = segs.into_iter().map(parse_id).collect::<Result<Vec<_>, _>>()?;
    Ok(Path::new(base, namespace, None))
}

fn node<T>(v: T) -> Node<T> {
    Node::with_maybe_source_loc(v, None)
}

fn schema_type_to_ast(ty: SchemaTypeJson) -> Result<Type, JsonSchemaError> {
    match ty {
        SchemaTypeJson::TypeDef { type_name } => Ok(Type::Ident(path_from_str(&type_name)?)),
        SchemaTypeJson::Typed(v) => match v {
            SchemaTypeVariantJson::String => Ok(Type::Ident(Path::single(parse_id("String")?, None))),
            SchemaTypeVariantJson::Long => Ok(Type::Ident(Path::single(parse_id("Long")?, None))),
            SchemaTypeVariantJson::Boolean => Ok(Type::Ident(Path::single(parse_id("Bool")?, None))),
            SchemaTypeVariantJson::Set { element } => Ok(Type::Set(Box::new(node(schema_type_to_ast(*element)?)))),
            SchemaTypeVariantJson::Record {
                attributes,
                additional_attributes: _,
            } => {
                let mut fields: Vec<(SmolStr, TypeOfAttributeJson)> = attributes.into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                let decls = fields
                    .into_iter()
                    .map(|(name, attr)| {
                        let annotations = annotations_to_ast(attr.annotations)?;
                        let ty = schema_type_to_ast(attr.ty)?;
                        Ok(node(Annotated {
                            data: AttrDecl {
                                name: node(name),
                                required: attr.required,
                                ty: node(ty),
                            },
                            annotations,
                        }))
                    })
                    .collect::<Result<Vec<_>, JsonSchemaError>>()?;
                Ok(Type::Record(decls))
            }
            SchemaTypeVariantJson::Entity { name } | SchemaTypeVariantJson::EntityOrCommon { name } => {
                Ok(Type::Ident(path_from_str(&name)?))
            }
            SchemaTypeVariantJson::Extension { name } => Ok(Type::Ident(Path::single(parse_id(&name)?, None))),
        },
    }
}

/// `None` and an explicit empty record both mean "no shape was meaningfully
/// given"; JSON can't express the Cedar-text distinction between an absent
/// shape and `= {}`, so both normalize to `attrs: None` here.
fn shape_to_attrs(shape: Option<SchemaTypeJson>) -> Result<Option<Node<Vec<Node<Annotated<AttrDecl>>>>>, JsonSchemaError> {
    let Some(shape) = shape else { return Ok(None) };
    match schema_type_to_ast(shape)? {
        Type::Record(fields) if fields.is_empty() => Ok(None),
        Type::Record(fields) => Ok(Some(node(fields))),
        _ => Ok(None),
    }
}

fn entity_type_to_decl(name: &str, et: EntityTypeJson) -> Result<EntityDecl, JsonSchemaError> {
    let id = node(parse_id(name)?);
    if let Some(choices) = et.enum_values {
        if !et.member_of_types.is_empty() || et.shape.is_some() || et.tags.is_some() {
            return Err(JsonSchemaError::EnumWithOtherFields(name.to_string()));
        }
        return Ok(EntityDecl::Enum(EnumEntityDecl {
            names: NonEmpty::new(id),
            choices: choices.into_iter().map(node).collect(),
        }));
    }
    let member_of_types = et
        .member_of_types
        .iter()
        .map(|s| path_from_str(s))
        .collect::<Result<Vec<_>, _>>()?;
    let attrs = shape_to_attrs(et.shape)?;
    let tags = match et.tags {
        Some(t) => Some(node(schema_type_to_ast(t)?)),
        None => None,
    };
    Ok(EntityDecl::Standard(StandardEntityDecl {
        names: NonEmpty::new(id),
        member_of_types,
        attrs,
        tags,
    }))
}

fn action_uid_to_qualname(uid: ActionEntityUidJson) -> Result<QualName, JsonSchemaError> {
    let path = match uid.ty {
        Some(ty) => Some(path_from_str(&ty)?),
        None => None,
    };
    Ok(QualName { path, eid: uid.id })
}

fn action_type_to_decl(name: &str, at: ActionTypeJson) -> Result<ActionDecl, JsonSchemaError> {
    let parents = match at.member_of {
        Some(parents) if !parents.is_empty() => Some(
            NonEmpty::from_vec(
                parents
                    .into_iter()
                    .map(|p| Ok(node(action_uid_to_qualname(p)?)))
                    .collect::<Result<Vec<_>, JsonSchemaError>>()?,
            )
            .expect("checked non-empty above"),
        ),
        _ => None,
    };
    let app_decls = match at.applies_to {
        Some(spec) => {
            let mut items = Vec::new();
            if let Some(tys) = spec.principal_types {
                let entity_tys = tys.iter().map(|s| path_from_str(s)).collect::<Result<Vec<_>, _>>()?;
                items.push(node(AppDecl::PR(crate::validator::cedar_schema::ast::PRAppDecl {
                    kind: node(PR::Principal),
                    entity_tys,
                })));
            }
            if let Some(tys) = spec.resource_types {
                let entity_tys = tys.iter().map(|s| path_from_str(s)).collect::<Result<Vec<_>, _>>()?;
                items.push(node(AppDecl::PR(crate::validator::cedar_schema::ast::PRAppDecl {
                    kind: node(PR::Resource),
                    entity_tys,
                })));
            }
            if let Some(ctx) = spec.context {
                if let SchemaTypeJson::TypeDef { type_name } = ctx {
                    items.push(node(AppDecl::Context(Either::Left(path_from_str(&type_name)?))));
                } else if let Type::Record(fields) = schema_type_to_ast(ctx)? {
                    if !fields.is_empty() {
                        items.push(node(AppDecl::Context(Either::Right(node(fields)))));
                    }
                }
            }
            NonEmpty::from_vec(items).map(node)
        }
        None => None,
    };
    Ok(ActionDecl {
        names: NonEmpty::new(node(SmolStr::from(name))),
        parents,
        app_decls,
    })
}

/// Converts a parsed [`SchemaFragmentJson`] into the shared AST [`Schema`].
pub fn to_ast(frag: SchemaFragmentJson) -> Result<Schema, JsonSchemaError> {
    let mut namespaces = Vec::with_capacity(frag.0.len());
    for (ns_name, ns_def) in frag.0 {
        let name = if ns_name.is_empty() {
            None
        } else {
            Some(path_from_str(&ns_name)?)
        };
        let mut decls = Vec::new();
        let mut common_types: Vec<(SmolStr, SchemaTypeJson)> = ns_def.common_types.into_iter().collect();
        common_types.sort_by(|a, b| a.0.cmp(&b.0));
        for (tname, tdef) in common_types {
            decls.push(Annotated {
                data: node(Declaration::Type(TypeDecl {
                    name: node(parse_id(&tname)?),
                    def: node(schema_type_to_ast(tdef)?),
                })),
                annotations: build_annotations(Vec::new()).expect("no duplicates in an empty list"),
            });
        }
        let mut entity_types: Vec<(SmolStr, EntityTypeJson)> = ns_def.entity_types.into_iter().collect();
        entity_types.sort_by(|a, b| a.0.cmp(&b.0));
        for (ename, edef) in entity_types {
            let annotations = annotations_to_ast(edef.annotations.clone())?;
            decls.push(Annotated {
                data: node(Declaration::Entity(entity_type_to_decl(&ename, edef)?)),
                annotations,
            });
        }
        let mut actions: Vec<(SmolStr, ActionTypeJson)> = ns_def.actions.into_iter().collect();
        actions.sort_by(|a, b| a.0.cmp(&b.0));
        for (aname, adef) in actions {
            let annotations = annotations_to_ast(adef.annotations.clone())?;
            decls.push(Annotated {
                data: node(Declaration::Action(action_type_to_decl(&aname, adef)?)),
                annotations,
            });
        }
        namespaces.push(Annotated {
            data: Namespace { name, decls, loc: None },
            annotations: annotations_to_ast(ns_def.annotations)?,
        });
    }
    Ok(namespaces)
}

/// Parses a JSON schema document (as text) straight into the shared AST.
pub fn parse_schema(src: &[u8]) -> Result<Schema, JsonSchemaError> {
    let frag: SchemaFragmentJson = serde_json::from_slice(src)?;
    to_ast(frag)
}

fn attrs_to_json(fields: &[Node<Annotated<AttrDecl>>]) -> HashMap<SmolStr, TypeOfAttributeJson> {
    fields
        .iter()
        .map(|f| {
            (
                f.node.data.name.node.clone(),
                TypeOfAttributeJson {
                    ty: ast_type_to_json(&f.node.data.ty.node),
                    required: f.node.data.required,
                    annotations: annotations_to_json(&f.node.annotations),
                },
            )
        })
        .collect()
}

/// A bare identifier is ambiguous between a primitive, an extension type, an
/// entity type, and a common type until the resolver classifies it; only the
/// first two are distinguishable here without resolving, so anything else
/// round-trips through the `EntityOrCommon` tag (spec.md §4.3, §4.5).
fn ast_type_to_json(ty: &Type) -> SchemaTypeJson {
    match ty {
        Type::Set(inner) => SchemaTypeJson::Typed(SchemaTypeVariantJson::Set {
            element: Box::new(ast_type_to_json(&inner.node)),
        }),
        Type::Record(fields) => SchemaTypeJson::Typed(SchemaTypeVariantJson::Record {
            attributes: attrs_to_json(fields),
            additional_attributes: false,
        }),
        Type::Ident(path) => {
            if let Some(id) = path.as_single_ident() {
                match id.as_ref() {
                    "String" => return SchemaTypeJson::Typed(SchemaTypeVariantJson::String),
                    "Long" => return SchemaTypeJson::Typed(SchemaTypeVariantJson::Long),
                    "Bool" => return SchemaTypeJson::Typed(SchemaTypeVariantJson::Boolean),
                    name if EXTENSION_TYPES.contains(&name) => {
                        return SchemaTypeJson::Typed(SchemaTypeVariantJson::Extension {
                            name: path.to_string().to_smolstr(),
                        })
                    }
                    _ => {}
                }
            }
            SchemaTypeJson::Typed(SchemaTypeVariantJson::EntityOrCommon {
                name: path.to_string().to_smolstr(),
            })
        }
    }
}

fn entity_decl_to_json(decl: &EntityDecl) -> EntityTypeJson {
    match decl {
        EntityDecl::Enum(d) => EntityTypeJson {
            member_of_types: vec![],
            shape: None,
            tags: None,
            enum_values: Some(d.choices.iter().map(|c| c.node.clone()).collect()),
            annotations: HashMap::new(),
        },
        EntityDecl::Standard(d) => EntityTypeJson {
            member_of_types: d.member_of_types.iter().map(|p| p.to_string().to_smolstr()).collect(),
            shape: d.attrs.as_ref().map(|attrs| {
                SchemaTypeJson::Typed(SchemaTypeVariantJson::Record {
                    attributes: attrs_to_json(&attrs.node),
                    additional_attributes: false,
                })
            }),
            tags: d.tags.as_ref().map(|t| ast_type_to_json(&t.node)),
            enum_values: None,
            annotations: HashMap::new(),
        },
    }
}

fn action_decl_to_json(decl: &ActionDecl) -> ActionTypeJson {
    let member_of = decl.parents.as_ref().map(|parents| {
        parents
            .iter()
            .map(|qn| ActionEntityUidJson {
                id: qn.node.eid.clone(),
                ty: qn.node.path.as_ref().map(|p| p.to_string().to_smolstr()),
            })
            .collect()
    });
    let applies_to = decl.app_decls.as_ref().map(|decls| {
        let mut principal_types = None;
        let mut resource_types = None;
        let mut context = None;
        for item in decls.node.iter() {
            match &item.node {
                AppDecl::PR(pr) => {
                    let tys: Vec<SmolStr> = pr.entity_tys.iter().map(|p| p.to_string().to_smolstr()).collect();
                    match pr.kind.node {
                        PR::Principal => principal_types = Some(tys),
                        PR::Resource => resource_types = Some(tys),
                    }
                }
                AppDecl::Context(Either::Left(path)) => {
                    context = Some(SchemaTypeJson::TypeDef {
                        type_name: path.to_string().to_smolstr(),
                    });
                }
                AppDecl::Context(Either::Right(fields)) => {
                    context = Some(SchemaTypeJson::Typed(SchemaTypeVariantJson::Record {
                        attributes: attrs_to_json(&fields.node),
                        additional_attributes: false,
                    }));
                }
            }
        }
        ApplySpecJson {
            principal_types,
            resource_types,
            context,
        }
    });
    ActionTypeJson {
        applies_to,
        member_of,
        annotations: HashMap::new(),
    }
}

/// Converts the shared AST [`Schema`] into a [`SchemaFragmentJson`]. The
/// reverse of [`to_ast`]; composed with it, `to_ast(from_ast(s))` preserves
/// `s`'s semantics even though the two directions don't share a
/// representation for every case (e.g. `None` vs. explicit-empty shapes
/// collapse to the same JSON on the way out, per [`shape_to_attrs`]).
pub fn from_ast(schema: &Schema) -> SchemaFragmentJson {
    let mut out = HashMap::with_capacity(schema.len());
    for ns in schema {
        let key = ns.data.name.as_ref().map(|p| p.to_string()).unwrap_or_default().to_smolstr();
        let mut common_types = HashMap::new();
        let mut entity_types = HashMap::new();
        let mut actions = HashMap::new();
        for decl in &ns.data.decls {
            match &decl.data.node {
                Declaration::Type(t) => {
                    common_types.insert(t.name.node.to_smolstr(), ast_type_to_json(&t.def.node));
                }
                Declaration::Entity(e) => {
                    let mut json = entity_decl_to_json(e);
                    json.annotations = annotations_to_json(&decl.annotations);
                    for name in e.names() {
                        entity_types.insert(name.node.to_smolstr(), json.clone());
                    }
                }
                Declaration::Action(a) => {
                    let mut json = action_decl_to_json(a);
                    json.annotations = annotations_to_json(&decl.annotations);
                    for name in a.names.iter() {
                        actions.insert(name.node.clone(), json.clone());
                    }
                }
            }
        }
        out.insert(
            key,
            NamespaceDefinitionJson {
                common_types,
                entity_types,
                actions,
                annotations: annotations_to_json(&ns.annotations),
            },
        );
    }
    SchemaFragmentJson(out)
}

/// Recursively sorts object keys. The DTOs use plain `HashMap`s (so their own
/// iteration order is arbitrary); running the serialized value through this
/// before printing gives the same determinism spec.md §8 asks of the
/// Cedar-text emitter. Relies on the `preserve_order` `serde_json` feature so
/// that insertion order (here, sorted order) survives into the printed text.
fn sort_json_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(String, serde_json::Value)> =
                map.into_iter().map(|(k, v)| (k, sort_json_keys(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(entries.into_iter().collect())
        }
        serde_json::Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(sort_json_keys).collect()),
        other => other,
    }
}

/// Serializes a [`Schema`] as pretty-printed, deterministically-ordered JSON
/// text.
pub fn emit_schema(schema: &Schema) -> Result<String, JsonSchemaError> {
    let frag = from_ast(schema);
    let value = sort_json_keys(serde_json::to_value(&frag)?);
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn namespace_entity_action_and_attribute_annotations_round_trip() {
        let src = r#"{
            "NS": {
                "annotations": { "doc": "a namespace" },
                "entityTypes": {
                    "User": {
                        "annotations": { "doc": "a user" },
                        "shape": {
                            "type": "Record",
                            "attributes": {
                                "name": { "type": "String", "annotations": { "doc": "display name" } }
                            }
                        }
                    }
                },
                "actions": {
                    "view": { "annotations": { "doc": "an action" } }
                }
            }
        }"#;
        let ast = parse_schema(src.as_bytes()).unwrap();
        let ns = ast.iter().find(|n| n.data.name.is_some()).unwrap();
        assert_eq!(ns.annotations.get(&"doc".parse::<AnyId>().unwrap()).unwrap().value.as_deref(), Some("a namespace"));
        let entity = ns
            .data
            .decls
            .iter()
            .find(|d| matches!(&d.data.node, Declaration::Entity(_)))
            .unwrap();
        assert_eq!(entity.annotations.get(&"doc".parse::<AnyId>().unwrap()).unwrap().value.as_deref(), Some("a user"));
        let action = ns
            .data
            .decls
            .iter()
            .find(|d| matches!(&d.data.node, Declaration::Action(_)))
            .unwrap();
        assert_eq!(action.annotations.get(&"doc".parse::<AnyId>().unwrap()).unwrap().value.as_deref(), Some("an action"));

        let reemitted = emit_schema(&ast).unwrap();
        let reparsed = parse_schema(reemitted.as_bytes()).unwrap();
        assert_eq!(emit_schema(&reparsed).unwrap(), reemitted);
    }

    #[test]
    fn entity_type_with_unknown_field_is_still_rejected() {
        let src = r#"{"": {"entityTypes": {"User": {"bogus": 1}}, "actions": {}}}"#;
        assert!(parse_schema(src.as_bytes()).is_err());
    }
}
