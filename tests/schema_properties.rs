//! Integration tests for the universal invariants and seed scenarios
//! covering the Cedar-text parser, JSON codec, emitter, and resolver.

use cedar_schema_core::validator::cedar_schema::{emit_cedar, parse_schema as parse_cedar};
use cedar_schema_core::validator::resolve;
use cedar_schema_core::{Schema, SchemaBuilder};

fn parse(src: &str) -> cedar_schema_core::validator::cedar_schema::ast::Schema {
    parse_cedar(src.as_bytes(), None).unwrap()
}

// S1
#[test]
fn s1_single_entity_round_trips() {
    let ast = parse("entity User;");
    assert_eq!(emit_cedar(&ast).unwrap(), "entity User;\n");
}

// S2
#[test]
fn s2_comma_headed_entities_share_body_and_closure() {
    let ast = parse("entity User, Admin in [Group] { name: String } tags Long; entity Group;");
    let resolved = resolve(&ast).unwrap();
    let group = resolved
        .entity_types
        .iter()
        .find(|(k, _)| k.basename.as_ref() == "Group")
        .unwrap()
        .1;
    let descendant_names: std::collections::BTreeSet<&str> =
        group.descendants.iter().map(|n| n.basename.as_ref()).collect();
    assert_eq!(
        descendant_names,
        std::collections::BTreeSet::from(["User", "Admin"])
    );

    for name in ["User", "Admin"] {
        let (_, et) = resolved
            .entity_types
            .iter()
            .find(|(k, _)| k.basename.as_ref() == name)
            .unwrap();
        assert!(et.attributes.attributes.contains_key("name"));
        assert!(et.tags.is_some());
    }
}

// S3
#[test]
fn s3_enum_parses_and_duplicate_entity_name_is_rejected() {
    parse(r#"entity Status enum ["active","inactive"];"#);
    let err = parse_cedar(
        br#"entity Status enum ["active","inactive"]; entity Status;"#,
        None,
    );
    assert!(err.is_err());
}

// S4
#[test]
fn s4_action_in_string_round_trips() {
    let ast = parse(r#"action view in "readActions";"#);
    assert_eq!(emit_cedar(&ast).unwrap(), "action view in \"readActions\";\n");
    let resolved = resolve(&ast).unwrap();
    let (uid, action) = resolved.actions.iter().next().unwrap();
    assert_eq!(uid.id, "view");
    assert_eq!(action.member_of.len(), 1);
    assert_eq!(action.member_of[0].id, "readActions");
}

// S5
#[test]
fn s5_duplicate_annotation_is_rejected() {
    parse(r#"@doc("A") entity User;"#);
    let err = parse_cedar(br#"@doc("A") @doc("B") entity User;"#, None);
    assert!(err.is_err());
}

// S6
#[test]
fn s6_malformed_input_never_panics() {
    for src in [
        "\"\"\"",
        "entity User in",
        "\x00\x00\x00",
        "{{{{{{{{",
        "}}}}}}}}",
        &"entity A;".repeat(50_000),
    ] {
        let _ = parse_cedar(src.as_bytes(), None);
    }
}

// S7
#[test]
fn s7_self_referential_memberof_is_its_own_descendant() {
    let ast = parse("entity A in [A];");
    let resolved = resolve(&ast).unwrap();
    let (_, a) = resolved.entity_types.iter().find(|(k, _)| k.basename.as_ref() == "A").unwrap();
    assert!(a.descendants.iter().any(|d| d.basename.as_ref() == "A"));
}

// S8
#[test]
fn s8_quoted_attribute_name_round_trips() {
    let ast = parse(r#"entity U { "my-attr": String };"#);
    let emitted = emit_cedar(&ast).unwrap();
    assert!(emitted.contains("\"my-attr\""));
    let reparsed = parse(&emitted);
    assert_eq!(emit_cedar(&reparsed).unwrap(), emitted);
}

// Property 1: idempotent round trip.
#[test]
fn property_emit_is_idempotent() {
    let srcs = [
        "entity User;",
        "entity User, Admin in [Group] { name: String } tags Long; entity Group;",
        r#"entity Status enum ["active","inactive"];"#,
        r#"action view in "readActions";"#,
        "namespace NS { entity User; type Alias = String; }",
        "entity A in [A];",
    ];
    for src in srcs {
        let once = emit_cedar(&parse(src)).unwrap();
        let twice = emit_cedar(&parse(&once)).unwrap();
        assert_eq!(once, twice, "not idempotent for {src:?}");
    }
}

// Property 2: JSON -> Cedar text -> Cedar AST matches JSON -> AST directly
// (up to resolution, since attribute order may differ before inlining).
#[test]
fn property_json_and_cedar_text_resolve_identically() {
    let json = r#"{
        "": {
            "entityTypes": {
                "User": { "memberOfTypes": ["Group"] },
                "Group": {}
            },
            "actions": {
                "view": {
                    "appliesTo": {
                        "principalTypes": ["User"],
                        "resourceTypes": ["Group"],
                        "context": {"type": "Record", "attributes": {}}
                    }
                }
            }
        }
    }"#;
    let from_json = Schema::from_json_str(json).unwrap();
    let as_cedar_text = from_json.to_cedar_string().unwrap();
    let reparsed = Schema::from_cedar_str(&as_cedar_text, None).unwrap();
    assert_eq!(from_json.resolve().unwrap(), reparsed.resolve().unwrap());
}

// Property 3: resolving twice yields equal values (no hidden mutation / RNG).
#[test]
fn property_resolve_is_deterministic() {
    let ast = parse("entity User, Admin in [Group] { name: String }; entity Group; action view appliesTo { principal: [User], resource: [Group] };");
    assert_eq!(resolve(&ast).unwrap(), resolve(&ast).unwrap());
}

// Property 5: siblings of the same category emit in lexicographic order.
#[test]
fn property_emitter_orders_siblings_lexicographically() {
    let ast = parse("entity Zebra; entity Apple; entity Mango;");
    let emitted = emit_cedar(&ast).unwrap();
    let pos = |name: &str| emitted.find(name).unwrap();
    assert!(pos("Apple") < pos("Mango"));
    assert!(pos("Mango") < pos("Zebra"));
}

// Empty-context normalization (spec §4.3/§9): explicit `context: {}` in JSON
// must resolve the same as omitting `appliesTo` context entirely.
#[test]
fn empty_context_normalizes_to_no_context() {
    let with_empty = r#"{"": {"entityTypes": {"User": {}}, "actions": {
        "view": {"appliesTo": {"principalTypes": ["User"], "resourceTypes": ["User"], "context": {"type": "Record", "attributes": {}}}}
    }}}"#;
    let without = r#"{"": {"entityTypes": {"User": {}}, "actions": {
        "view": {"appliesTo": {"principalTypes": ["User"], "resourceTypes": ["User"]}}
    }}}"#;
    let a = Schema::from_json_str(with_empty).unwrap().resolve().unwrap();
    let b = Schema::from_json_str(without).unwrap().resolve().unwrap();
    assert_eq!(a, b);
}

// The builder surface must be able to reproduce parser output semantically.
#[test]
fn builder_matches_parsed_schema_after_resolution() {
    let built = SchemaBuilder::new()
        .entity("Group")
        .unwrap()
        .entity_with("User", &["Group"], Vec::new(), None)
        .unwrap()
        .action_with("view", &[], Some(&["User"]), Some(&["Group"]), None)
        .unwrap()
        .build();
    let parsed = parse("entity Group; entity User in [Group]; action view appliesTo { principal: [User], resource: [Group] };");
    assert_eq!(resolve(&built).unwrap(), resolve(&parsed).unwrap());
}

// Undefined references are rejected by the resolver, not silently dropped.
#[test]
fn undefined_entity_reference_is_a_resolve_error() {
    let ast = parse("entity User in [Ghost];");
    assert!(resolve(&ast).is_err());
}

// A common-type cycle is rejected rather than looping forever.
#[test]
fn common_type_cycle_is_a_resolve_error() {
    let ast = parse("type A = B; type B = A; entity User { x: A };");
    assert!(resolve(&ast).is_err());
}

// An empty `principalTypes`/`resourceTypes` list ("no type is ever allowed")
// is a JSON-only state: Cedar text's `principal: [...]` has no syntax for
// zero entries, so emitting it must fail instead of producing text the
// parser then rejects.
#[test]
fn empty_principal_type_list_cannot_be_emitted_as_cedar_text() {
    let json = r#"{"": {"entityTypes": {"User": {}}, "actions": {
        "view": {"appliesTo": {"principalTypes": [], "resourceTypes": ["User"]}}
    }}}"#;
    let schema = Schema::from_json_str(json).unwrap();
    assert!(schema.to_cedar_string().is_err());
}
