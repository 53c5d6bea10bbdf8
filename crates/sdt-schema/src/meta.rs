//! # Document Meta-Schema
//!
//! The schema served for a whole `*.sdt.yaml` document. The `schemas`
//! section is always described; `template` is added only when the output
//! schema could be augmented.

use serde_json::{json, Value};

use crate::augment::augment_schema;
use crate::error::SchemaError;
use crate::pointer::SchemaPath;

/// Where the augmented template schema sits in the document schema.
pub const TEMPLATE_POINTER: &str = "#/properties/template";

/// Meta-schema the `input` and `output` declarations are checked against.
pub const DECLARATION_META_SCHEMA: &str = "https://json-schema.org/draft-07/schema";

/// Dialects a document may name in `schemas.dialect`.
pub const DIALECTS: [&str; 8] = [
    "openapi-3.1",
    "openapi-3.0",
    "http://json-schema.org/schema",
    "https://json-schema.org/draft/2020-12/schema",
    "https://json-schema.org/draft/2019-09/schema",
    "https://json-schema.org/draft-07/schema",
    "https://json-schema.org/draft-06/schema",
    "https://json-schema.org/draft-04/schema",
];

/// The document schema without a `template` section.
pub fn base_meta_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "schemas": {
                "type": "object",
                "description": "Input and output schemas",
                "properties": {
                    "dialect": {
                        "type": "string",
                        "description": "Default JSON Schema dialect if none is explicitly given via the $schema keyword",
                        "enum": DIALECTS
                    },
                    "input": {"$ref": DECLARATION_META_SCHEMA},
                    "output": {"$ref": DECLARATION_META_SCHEMA}
                }
            }
        }
    })
}

/// The document schema, with `template` set when one is given.
pub fn document_schema(template: Option<Value>) -> Value {
    let mut schema = base_meta_schema();
    if let (Some(template), Some(properties)) = (
        template,
        schema.get_mut("properties").and_then(Value::as_object_mut),
    ) {
        properties.insert("template".to_string(), template);
    }
    schema
}

/// Check that a template placed at `at` is validated as a document
/// property: a chain of `properties/<name>` pairs that leaves the `schemas`
/// declaration alone.
///
/// # Errors
///
/// Returns `SchemaError::TemplatePlacement` describing the problem.
pub fn check_template_pointer(at: &SchemaPath) -> Result<(), SchemaError> {
    let reject = |reason| {
        Err(SchemaError::TemplatePlacement {
            pointer: at.to_string(),
            reason,
        })
    };
    let tokens = at.tokens();
    if tokens.is_empty() {
        return reject("the root holds the document schema itself");
    }
    if tokens.len() % 2 != 0 || tokens.iter().step_by(2).any(|t| t != "properties") {
        return reject("expected a chain of `properties/<name>` steps");
    }
    if tokens[1] == "schemas" {
        return reject("`schemas` is reserved for the schema declarations");
    }
    Ok(())
}

/// The document schema with `template` placed at `at` instead of the
/// default location. Missing intermediate objects are created; anything
/// non-object in the way is replaced. `at` should pass
/// [`check_template_pointer`].
pub fn document_schema_at(template: Value, at: &SchemaPath) -> Value {
    let mut schema = base_meta_schema();
    insert_at(&mut schema, at.tokens(), template);
    schema
}

fn insert_at(slot: &mut Value, tokens: &[String], template: Value) {
    match tokens.split_first() {
        None => *slot = template,
        Some((head, rest)) => {
            if !slot.is_object() {
                *slot = json!({});
            }
            if let Value::Object(map) = slot {
                insert_at(map.entry(head.clone()).or_insert(Value::Null), rest, template);
            }
        }
    }
}

/// Augment `output` under [`TEMPLATE_POINTER`] and wrap it in the document
/// schema.
///
/// # Errors
///
/// Returns `SchemaError` if `output` cannot be loaded into an arena.
pub fn document_schema_for_output(output: &Value) -> Result<Value, SchemaError> {
    let root = SchemaPath::parse(TEMPLATE_POINTER)?;
    document_schema_for_output_at(output, &root)
}

/// Augment `output` under `at` and place it there in the document schema.
///
/// # Errors
///
/// Returns `SchemaError` if `at` is not a usable template location or
/// `output` cannot be loaded into an arena.
pub fn document_schema_for_output_at(output: &Value, at: &SchemaPath) -> Result<Value, SchemaError> {
    check_template_pointer(at)?;
    Ok(document_schema_at(augment_schema(output, at)?, at))
}
