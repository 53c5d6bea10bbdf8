//! # Directive Grammar
//!
//! The fixed set of template directives, expressed as JSON Schema fragments.
//! Each fragment is parameterized by references into the augmented
//! document; no directive is ever evaluated here.
//!
//! | Directive       | Shape                                                  | Offered for        |
//! |-----------------|--------------------------------------------------------|--------------------|
//! | Conditional     | `{"$if": expr-or-bool, "$then": R, "$else"?: R}`       | every node         |
//! | Interpolation   | `"${...}"`                                             | non-string nodes   |
//! | Loop            | `{"$for": expr-or-array, "$as"?: name, "$each": item}` | `type: array`      |
//! | Flatten         | `{"$flatten": [R, ...] \| Loop-with-$each-R}`          | `type: array`      |

use serde::Serialize;
use serde_json::{json, Value};

use crate::pointer::SchemaPath;

/// Pattern every interpolation string must match.
pub const INTERPOLATION_PATTERN: &str = r"^\$\{.*\}$";

/// Editor-facing message for strings that should be interpolations.
pub const INTERPOLATION_ERROR: &str = "String should be interpolated: ${...}";

/// Loop variable name when `$as` is omitted.
pub const DEFAULT_LOOP_VARIABLE: &str = "items";

/// Target of a directive slot that must hold a schema-conforming value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    /// A location in the augmented document.
    Pointer(SchemaPath),
    /// No constraint; used when an array declares no single `items` schema.
    Any,
}

impl SchemaRef {
    fn to_schema(&self) -> Value {
        match self {
            Self::Pointer(path) => json!({ "$ref": path.to_string() }),
            Self::Any => json!({}),
        }
    }
}

/// A `$for` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopDirective {
    /// Schema each iteration must produce.
    pub each: SchemaRef,
}

impl LoopDirective {
    fn to_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "$for": {
                    "description": "For loop variable expression",
                    "oneOf": [interpolated_string(), {"type": "array"}]
                },
                "$as": {
                    "type": "string",
                    "description": "Name of the loop variable (default is `items`)",
                    "default": DEFAULT_LOOP_VARIABLE
                },
                "$each": self.each.to_schema()
            },
            "required": ["$for", "$each"],
            "additionalProperties": false
        })
    }
}

/// One template directive, ready to be emitted as a `oneOf` alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `$if` / `$then` / `$else`; both branches validate against `target`.
    Conditional { target: SchemaPath },
    /// A bare `${...}` expression standing in for the value.
    Interpolation,
    /// `$for` producing one array element per iteration.
    Loop(LoopDirective),
    /// `$flatten` over a list of arrays, or over a loop producing arrays.
    Flatten {
        /// Schema of each flattened array (the array node itself).
        list: SchemaRef,
        /// The loop form, whose `$each` produces a whole array.
        each: LoopDirective,
    },
}

impl Directive {
    /// Conditional alternative referencing the augmented node at `target`.
    pub fn conditional(target: &SchemaPath) -> Self {
        Self::Conditional {
            target: target.clone(),
        }
    }

    /// Plain loop whose iterations produce values for `item`.
    pub fn for_loop(item: SchemaRef) -> Self {
        Self::Loop(LoopDirective { each: item })
    }

    /// Flatten alternative for the array node at `target`.
    pub fn flatten(target: &SchemaPath) -> Self {
        let whole = SchemaRef::Pointer(target.clone());
        Self::Flatten {
            list: whole.clone(),
            each: LoopDirective { each: whole },
        }
    }

    /// Render the directive as a JSON Schema fragment.
    pub fn to_schema(&self) -> Value {
        match self {
            Self::Conditional { target } => {
                let branch = SchemaRef::Pointer(target.clone()).to_schema();
                json!({
                    "type": "object",
                    "properties": {
                        "$if": {
                            "description": "Branching condition expression",
                            "oneOf": [interpolated_string(), {"type": "boolean"}]
                        },
                        "$then": branch.clone(),
                        "$else": branch
                    },
                    "required": ["$if", "$then"],
                    "additionalProperties": false
                })
            }
            Self::Interpolation => json!({
                "type": "string",
                "pattern": INTERPOLATION_PATTERN,
                "description": "Interpolated string",
                "errorMessage": INTERPOLATION_ERROR
            }),
            Self::Loop(l) => l.to_schema(),
            Self::Flatten { list, each } => json!({
                "type": "object",
                "properties": {
                    "$flatten": {
                        "description": "Flatten an array of arrays one level into a single array",
                        "oneOf": [
                            {"type": "array", "items": list.to_schema()},
                            each.to_schema()
                        ]
                    }
                },
                "required": ["$flatten"],
                "additionalProperties": false
            }),
        }
    }
}

impl Serialize for Directive {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_schema().serialize(serializer)
    }
}

fn interpolated_string() -> Value {
    json!({
        "type": "string",
        "pattern": INTERPOLATION_PATTERN,
        "errorMessage": INTERPOLATION_ERROR
    })
}
