//! # Reference Resolution
//!
//! Output schemas are dereferenced before augmentation. Dereferencing is
//! an injected async capability so hosts can plug in network-aware
//! resolvers; the adapter bounds every call with a timeout.
//!
//! Two resolvers ship with the crate:
//!
//! - [`InlineResolver`] replaces local `$ref`s with their targets. A
//!   reference met again while its own target is being inlined is cyclic
//!   and is left in place; the augmentation engine rewrites it. Remote
//!   references are rejected, which degrades delivery to the base schema.
//! - [`PassthroughResolver`] returns the schema unchanged and leaves all
//!   local references to the engine.

use std::future::Future;

use sdt_schema::SchemaPath;
use serde_json::{Map, Value};
use thiserror::Error;

/// Keywords holding instance data; `$ref`-shaped objects inside them are
/// not references.
const DATA_KEYWORDS: [&str; 4] = ["enum", "const", "default", "examples"];

/// Keywords mapping names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 6] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// Dereferencing failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A reference points at nothing this resolver can reach.
    #[error("unresolvable reference '{reference}'")]
    Unresolvable {
        /// The `$ref` value.
        reference: String,
    },

    /// A reference is not a well-formed pointer.
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The `$ref` value.
        reference: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// Resolver-specific failure.
    #[error("dereferencing failed: {0}")]
    Failed(String),
}

/// Async dereferencing capability.
pub trait ReferenceResolver: Send + Sync {
    /// Return `schema` with its references resolved.
    fn dereference(
        &self,
        schema: Value,
    ) -> impl Future<Output = Result<Value, ResolveError>> + Send;
}

/// Inlines local references; see the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineResolver;

impl InlineResolver {
    /// Inline every non-cyclic local reference in `schema`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` for remote, malformed, or dangling
    /// references.
    pub fn inline(schema: &Value) -> Result<Value, ResolveError> {
        // The root is being "expanded" from the start, so `{"$ref": "#"}`
        // always stays a reference.
        let mut expanding = vec![SchemaPath::root()];
        inline_schema(schema, schema, &mut expanding)
    }
}

impl ReferenceResolver for InlineResolver {
    fn dereference(
        &self,
        schema: Value,
    ) -> impl Future<Output = Result<Value, ResolveError>> + Send {
        async move { Self::inline(&schema) }
    }
}

/// Returns the schema untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl ReferenceResolver for PassthroughResolver {
    fn dereference(
        &self,
        schema: Value,
    ) -> impl Future<Output = Result<Value, ResolveError>> + Send {
        async move { Ok(schema) }
    }
}

fn inline_schema(
    value: &Value,
    root: &Value,
    expanding: &mut Vec<SchemaPath>,
) -> Result<Value, ResolveError> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                return inline_reference(reference, value, root, expanding);
            }
            let mut out = Map::new();
            for (key, v) in map {
                let inlined = match (key.as_str(), v) {
                    (k, _) if DATA_KEYWORDS.contains(&k) => v.clone(),
                    (k, Value::Object(named)) if SCHEMA_MAP_KEYWORDS.contains(&k) => {
                        let mut entries = Map::new();
                        for (name, schema) in named {
                            entries.insert(name.clone(), inline_schema(schema, root, expanding)?);
                        }
                        Value::Object(entries)
                    }
                    _ => inline_schema(v, root, expanding)?,
                };
                out.insert(key.clone(), inlined);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| inline_schema(v, root, expanding))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn inline_reference(
    reference: &str,
    original: &Value,
    root: &Value,
    expanding: &mut Vec<SchemaPath>,
) -> Result<Value, ResolveError> {
    if !SchemaPath::is_local(reference) {
        return Err(ResolveError::Unresolvable {
            reference: reference.to_string(),
        });
    }
    let path = SchemaPath::parse(reference).map_err(|e| ResolveError::InvalidReference {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;

    if expanding.contains(&path) {
        tracing::trace!(reference, "cyclic reference kept");
        return Ok(original.clone());
    }

    let target = root
        .pointer(&path.to_json_pointer())
        .ok_or_else(|| ResolveError::Unresolvable {
            reference: reference.to_string(),
        })?;

    expanding.push(path);
    let inlined = inline_schema(target, root, expanding);
    expanding.pop();
    inlined
}
