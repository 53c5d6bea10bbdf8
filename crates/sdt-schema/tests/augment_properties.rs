//! Behavioural checks of augmented schemas, run through a real Draft 7
//! validator: what a template may and may not contain once an output
//! schema has been augmented.

use sdt_schema::{document_schema_for_output, SchemaPath, TemplateValidator};
use serde_json::{json, Value};

fn validator(output: Value) -> TemplateValidator {
    TemplateValidator::for_output_schema("output", &output).expect("augmented schema compiles")
}

fn accepts(output: &Value, template: Value) -> bool {
    validator(output.clone()).is_valid_template(&template)
}

fn collect_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("$ref", Value::String(r)) => out.push(r),
                    ("enum" | "const" | "default" | "examples", _) => {}
                    _ => collect_refs(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

fn assert_local_refs_resolve(document: &Value) {
    let mut refs = Vec::new();
    collect_refs(document, &mut refs);
    assert!(!refs.is_empty());
    for reference in refs.into_iter().filter(|r| r.starts_with('#')) {
        let path = SchemaPath::parse(reference).unwrap();
        assert!(
            document.pointer(&path.to_json_pointer()).is_some(),
            "dangling reference {reference}"
        );
    }
}

// -- Literal pass-through ---------------------------------------------------

#[test]
fn conforming_literals_still_validate() {
    let output = json!({
        "type": "object",
        "properties": {
            "count": {"type": "number"},
            "name": {"type": "string"},
            "flags": {"type": "array", "items": {"type": "boolean"}},
            "meta": {"type": "object", "additionalProperties": {"type": "integer"}}
        },
        "required": ["count"],
        "additionalProperties": false
    });
    assert!(accepts(
        &output,
        json!({"count": 1, "name": "x", "flags": [true, false], "meta": {"a": 1}})
    ));
    assert!(accepts(&output, json!({"count": 2.5})));
}

#[test]
fn non_conforming_literals_are_still_rejected() {
    let output = json!({
        "type": "object",
        "properties": {"count": {"type": "number"}},
        "required": ["count"],
        "additionalProperties": false
    });
    assert!(!accepts(&output, json!({})));
    assert!(!accepts(&output, json!({"count": true})));
    assert!(!accepts(&output, json!({"count": 1, "other": 2})));
}

// -- Conditional ------------------------------------------------------------

#[test]
fn conditional_accepts_conforming_branches() {
    let output = json!({"type": "number"});
    assert!(accepts(&output, json!({"$if": true, "$then": 5})));
    assert!(accepts(&output, json!({"$if": "${flag}", "$then": 5, "$else": 6})));
    assert!(accepts(
        &output,
        json!({"$if": false, "$then": {"$if": "${nested}", "$then": 1}})
    ));
}

#[test]
fn conditional_is_well_formed() {
    let output = json!({"type": "number"});
    assert!(!accepts(&output, json!({"$if": true})));
    assert!(!accepts(&output, json!({"$if": "flag", "$then": 5})));
    assert!(!accepts(&output, json!({"$if": true, "$then": "five"})));
    assert!(!accepts(&output, json!({"$if": true, "$then": 5, "$else": "six"})));
    assert!(!accepts(&output, json!({"$if": true, "$then": 5, "$other": 1})));
}

// -- Interpolation ----------------------------------------------------------

#[test]
fn interpolation_stands_in_for_non_strings() {
    for output in [
        json!({"type": "number"}),
        json!({"type": "boolean"}),
        json!({"type": "object", "additionalProperties": false}),
        json!({"type": "array", "items": {"type": "number"}}),
    ] {
        assert!(accepts(&output, json!("${value}")), "{output}");
        assert!(!accepts(&output, json!("value")), "{output}");
    }
}

#[test]
fn strings_offer_no_interpolation_alternative() {
    let output = json!({"type": "string"});
    let document = document_schema_for_output(&output).unwrap();
    let alternatives = document["properties"]["template"]["oneOf"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    // An interpolation is simply a string literal here.
    assert!(accepts(&output, json!("${value}")));
    assert!(accepts(&output, json!("plain")));
}

// -- Loop -------------------------------------------------------------------

#[test]
fn loops_are_offered_for_arrays() {
    let output = json!({"type": "array", "items": {"type": "number"}});
    assert!(accepts(&output, json!({"$for": "${xs}", "$each": "${x}"})));
    assert!(accepts(&output, json!({"$for": [1, 2], "$as": "n", "$each": 3})));
    assert!(!accepts(&output, json!({"$for": 5, "$each": 3})));
    assert!(!accepts(&output, json!({"$for": "${xs}"})));
    assert!(!accepts(&output, json!({"$for": "${xs}", "$each": "three"})));
}

#[test]
fn loops_are_restricted_to_arrays() {
    for output in [
        json!({"type": "number"}),
        json!({"type": "string"}),
        json!({"type": "object", "additionalProperties": false}),
    ] {
        assert!(
            !accepts(&output, json!({"$for": [1, 2, 3], "$each": "${x}"})),
            "{output}"
        );
    }
}

#[test]
fn untyped_items_loop_over_anything() {
    let output = json!({"type": "array"});
    assert!(accepts(&output, json!({"$for": "${xs}", "$each": {"any": "thing"}})));
}

// -- Flatten ----------------------------------------------------------------

#[test]
fn flatten_accepts_lists_of_arrays_and_loops() {
    let output = json!({"type": "array", "items": {"type": "string"}});
    assert!(accepts(&output, json!({"$flatten": [["a", "b"], ["c"]]})));
    assert!(accepts(
        &output,
        json!({"$flatten": {"$for": "${groups}", "$each": ["a", "${b}"]}})
    ));
    assert!(!accepts(&output, json!({"$flatten": "not-an-array-or-loop"})));
    assert!(!accepts(&output, json!({"$flatten": [[1]]})));
}

// -- Nesting ----------------------------------------------------------------

#[test]
fn directives_nest_inside_properties() {
    let output = json!({
        "type": "object",
        "properties": {"a": {"type": "array", "items": {"type": "number"}}},
        "additionalProperties": false
    });
    assert!(accepts(&output, json!({"a": {"$for": [1, 2, 3], "$each": "${x}"}})));
    assert!(accepts(&output, json!({"a": {"$if": "${cond}", "$then": [1, 2, 3]}})));
    assert!(accepts(&output, json!({"a": [1, "${two}", {"$if": true, "$then": 3}]})));
    assert!(!accepts(&output, json!({"a": {"$if": "${cond}", "$then": ["x"]}})));
}

#[test]
fn directives_nest_inside_additional_properties() {
    let output = json!({"type": "object", "additionalProperties": {"type": "integer"}});
    assert!(accepts(&output, json!({"x": "${x}", "y": {"$if": true, "$then": 2}})));
    assert!(!accepts(&output, json!({"x": "nope"})));
}

// -- References -------------------------------------------------------------

#[test]
fn self_referencing_schema_stays_resolvable() {
    let output = json!({
        "type": "object",
        "properties": {
            "value": {"type": "number"},
            "children": {"type": "array", "items": {"$ref": "#"}}
        },
        "additionalProperties": false
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    assert!(accepts(
        &output,
        json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]})
    ));
    assert!(accepts(
        &output,
        json!({"value": 1, "children": [{"$if": true, "$then": {"value": "${v}"}}]})
    ));
    assert!(!accepts(&output, json!({"children": [{"value": "two"}]})));
}

#[test]
fn definitions_references_stay_resolvable() {
    let output = json!({
        "type": "object",
        "definitions": {
            "leaf": {"type": "number"},
            "tree": {
                "type": "object",
                "properties": {
                    "leaf": {"$ref": "#/definitions/leaf"},
                    "branches": {"type": "array", "items": {"$ref": "#/definitions/tree"}}
                },
                "additionalProperties": false
            }
        },
        "properties": {
            "root": {"$ref": "#/definitions/tree"},
            "total": {"$ref": "#/definitions/leaf"}
        },
        "additionalProperties": false
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    assert!(accepts(
        &output,
        json!({"root": {"leaf": 1, "branches": [{"leaf": 2}, {"branches": []}]}, "total": 3})
    ));
    assert!(accepts(
        &output,
        json!({"root": {"branches": {"$for": "${bs}", "$each": {"leaf": "${b}"}}}, "total": "${t}"})
    ));
    assert!(!accepts(&output, json!({"total": "three"})));
    assert!(!accepts(&output, json!({"root": {"branches": [{"leaf": "x"}]}})));
}

#[test]
fn nullable_self_reference_accepts_directives() {
    let output = json!({
        "type": "object",
        "properties": {
            "n": {"type": "number"},
            "next": {"anyOf": [{"$ref": "#"}, {"type": "null"}]}
        },
        "additionalProperties": false
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    assert!(accepts(&output, json!({"n": 1, "next": null})));
    assert!(accepts(&output, json!({"n": 1, "next": {"n": "${m}", "next": null}})));
    assert!(accepts(&output, json!({"n": 1, "next": {"$if": true, "$then": {"n": 2}}})));
    assert!(accepts(&output, json!({"n": 1, "next": "${x}"})));
    assert!(!accepts(&output, json!({"n": 1, "next": {"n": "two"}})));
    assert!(!accepts(&output, json!({"n": 1, "next": {"$if": true}})));
}

#[test]
fn root_reference_into_definitions_accepts_directives() {
    let output = json!({
        "$ref": "#/definitions/node",
        "definitions": {
            "node": {
                "type": "object",
                "properties": {
                    "v": {"type": "number"},
                    "kids": {"type": "array", "items": {"$ref": "#/definitions/node"}}
                },
                "additionalProperties": false
            }
        }
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    assert!(accepts(&output, json!({"v": 1, "kids": [{"v": 2}]})));
    assert!(accepts(&output, json!({"$if": true, "$then": {"v": 1}})));
    assert!(accepts(&output, json!("${tree}")));
    assert!(accepts(
        &output,
        json!({"v": 1, "kids": {"$for": "${xs}", "$each": {"v": "${x}"}}})
    ));
    assert!(!accepts(&output, json!({"v": "one"})));
}

#[test]
fn one_of_references_accept_directives_at_the_referring_position() {
    let output = json!({
        "type": "object",
        "definitions": {
            "circle": {
                "type": "object",
                "properties": {"r": {"type": "number"}},
                "required": ["r"],
                "additionalProperties": false
            },
            "square": {
                "type": "object",
                "properties": {"side": {"type": "number"}},
                "required": ["side"],
                "additionalProperties": false
            }
        },
        "properties": {
            "shape": {"oneOf": [{"$ref": "#/definitions/circle"}, {"$ref": "#/definitions/square"}]}
        },
        "additionalProperties": false
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    assert!(accepts(&output, json!({"shape": {"r": 1}})));
    assert!(accepts(&output, json!({"shape": {"side": "${s}"}})));
    assert!(accepts(&output, json!({"shape": {"$if": "${round}", "$then": {"r": 1}}})));
    assert!(accepts(&output, json!({"shape": "${shape}"})));
    assert!(!accepts(&output, json!({"shape": {"r": 1, "side": 2}})));
}

#[test]
fn escaped_property_names_produce_resolvable_back_references() {
    let output = json!({
        "type": "object",
        "properties": {
            "a/b": {"type": "array", "items": {"type": "number"}},
            "c~d": {"type": "number"},
            "e f": {"type": "number"}
        },
        "additionalProperties": false
    });
    let document = document_schema_for_output(&output).unwrap();
    assert_local_refs_resolve(&document);

    let then_ref = &document["properties"]["template"]["oneOf"][0]["properties"]["a/b"]["oneOf"]
        [1]["properties"]["$then"]["$ref"];
    assert_eq!(then_ref, "#/properties/template/oneOf/0/properties/a~1b");

    assert!(accepts(
        &output,
        json!({
            "a/b": {"$for": "${xs}", "$each": "${x}"},
            "c~d": {"$if": true, "$then": 1},
            "e f": {"$if": true, "$then": "${n}"}
        })
    ));
}

// -- Determinism ------------------------------------------------------------

#[test]
fn augmentation_is_deterministic() {
    let output = json!({
        "type": "object",
        "properties": {"z": {"type": "number"}, "a": {"type": "array"}},
        "definitions": {"d": {"type": "string"}}
    });
    let first = serde_json::to_string(&document_schema_for_output(&output).unwrap()).unwrap();
    let second = serde_json::to_string(&document_schema_for_output(&output).unwrap()).unwrap();
    assert_eq!(first, second);
}
