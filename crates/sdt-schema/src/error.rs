//! Errors raised while loading an output schema into the arena.

use thiserror::Error;

/// The output schema has a shape the augmentation engine cannot accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A schema position holds something other than an object or boolean.
    #[error("schema at '{pointer}' must be an object or boolean, found {found}")]
    NotASchema {
        /// Location in the source schema.
        pointer: String,
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A structural keyword has an unusable value.
    #[error("invalid `{keyword}` at '{pointer}': {reason}")]
    InvalidKeyword {
        /// Location in the source schema.
        pointer: String,
        /// Offending keyword.
        keyword: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A `$ref` string is not a fragment-only JSON pointer.
    #[error("invalid JSON pointer '{0}'")]
    InvalidPointer(String),

    /// The template cannot be placed at this pointer in the document schema.
    #[error("cannot place template at '{pointer}': {reason}")]
    TemplatePlacement {
        /// The requested location.
        pointer: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
