//! # sdt-schema — Schema Augmentation for SDT Templates
//!
//! An SDT document declares the JSON Schema its rendered output must
//! satisfy (`schemas.output`). Templates, however, are allowed to hold
//! directives (`$if`, `$for`, `$flatten`, `${...}` interpolation) anywhere a
//! literal could go. This crate derives the schema of *valid templates* from
//! the output schema, so an editor can validate and complete templates.
//!
//! ## Modules
//!
//! - [`pointer`]: fragment-only JSON pointers (`#/a/b`) with escaping.
//! - [`arena`]: the output schema loaded into an index-addressed arena;
//!   local `$ref`s resolve to node ids rather than owning pointers, so
//!   recursive schemas need no special handling.
//! - [`directive`]: the directive grammar, as schema fragments.
//! - [`augment`]: the augmentation engine.
//! - [`cache`]: fingerprint-validated memoization of augmentation results.
//! - [`meta`]: the document-level schema the augmented template sits in.
//! - [`validate`]: Draft 7 validation of documents against the result.
//!
//! ## Crate Policy
//!
//! - Depends only on `sdt-core` internally.
//! - Augmentation is a pure function of the output schema and the root
//!   pointer; identical inputs give byte-identical serializations.
//! - No network access. Remote `$ref`s are left untouched by the engine and
//!   never fetched by the validator.

pub mod arena;
pub mod augment;
pub mod cache;
pub mod directive;
pub mod error;
pub mod meta;
pub mod pointer;
pub mod validate;

pub use arena::{NodeId, SchemaArena, SchemaType, TypeSpec};
pub use augment::{augment_schema, Augmented, AugmentedSchemaNode, Augmenter};
pub use cache::{AugmentationCache, CacheStats};
pub use directive::{Directive, LoopDirective, SchemaRef};
pub use error::SchemaError;
pub use meta::{
    base_meta_schema, check_template_pointer, document_schema, document_schema_at, document_schema_for_output,
    document_schema_for_output_at, TEMPLATE_POINTER,
};
pub use pointer::SchemaPath;
pub use validate::{
    yaml_to_json_value, OfflineRetriever, SchemaValidationError, TemplateValidator,
    ValidationViolations, Violation,
};
