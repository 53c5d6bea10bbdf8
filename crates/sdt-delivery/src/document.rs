//! SDT document parsing.
//!
//! Only the `schemas` section matters here; the template is handed on
//! untouched.

use serde_json::Value;
use thiserror::Error;

/// The document could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The text is not YAML (or uses YAML with no JSON equivalent).
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The top level is not a mapping.
    #[error("document must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// A parsed SDT document.
#[derive(Debug, Clone, PartialEq)]
pub struct SdtDocument {
    root: Value,
}

impl SdtDocument {
    /// Parse document text.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let root = sdt_schema::validate::parse_yaml(text).map_err(DocumentError::Malformed)?;
        match root {
            Value::Object(_) => Ok(Self { root }),
            // An empty file is an empty document.
            Value::Null => Ok(Self {
                root: Value::Object(serde_json::Map::new()),
            }),
            other => Err(DocumentError::NotAMapping(match other {
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                _ => "array",
            })),
        }
    }

    /// `schemas.output`, unless absent or null.
    pub fn output_schema(&self) -> Option<&Value> {
        self.root
            .get("schemas")
            .and_then(|schemas| schemas.get("output"))
            .filter(|schema| !schema.is_null())
    }
}
