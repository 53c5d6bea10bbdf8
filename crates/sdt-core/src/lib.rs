//! # sdt-core — Foundational Types for the SDT Schema Stack
//!
//! Every other crate in the workspace depends on `sdt-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All fingerprint computation flows through
//!    `CanonicalBytes::new()`. Two output schemas that differ only in key
//!    order or whitespace produce the same bytes, and therefore the same
//!    cache key.
//!
//! 2. **`Fingerprint` accepts only `&CanonicalBytes`.** The cache cannot be
//!    keyed on raw, formatting-dependent serializations by construction.
//!
//! 3. **Identity newtypes.** `DocumentLocator` (what the editor hands us)
//!    and `SchemaIdentity` (what the schema protocol asks for) are distinct
//!    types, so a locator can never be used as a cache key by accident.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sdt-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{fingerprint, Fingerprint};
pub use error::CanonicalizationError;
pub use identity::{DocumentLocator, SchemaIdentity};
