//! # sdt-delivery — Schema Delivery for SDT Documents
//!
//! Connects the augmentation engine to an editor's schema protocol. The
//! editor asks for a schema URI per open document and then for the content
//! behind that URI; [`SchemaDelivery`] answers both.
//!
//! ## Collaborators
//!
//! Everything the adapter touches is injected:
//!
//! - [`DeliveryConfig`]: scheme, document suffix, template pointer,
//!   dereferencing timeout.
//! - [`DocumentRegistry`]: where document text comes from
//!   ([`InMemoryRegistry`] for open editor buffers, [`FsRegistry`] for disk).
//! - [`ReferenceResolver`]: async dereferencing of the output schema
//!   ([`InlineResolver`], [`PassthroughResolver`]).
//! - [`AugmentationCache`](sdt_schema::AugmentationCache): shared across
//!   adapters behind an `Arc`.
//!
//! ## Crate Policy
//!
//! - Content requests never fail for an SDT identity: every degraded path
//!   serves the base meta-schema and logs at `warn`.
//! - No process-wide state.

pub mod adapter;
pub mod config;
pub mod document;
pub mod protocol;
pub mod registry;
pub mod resolver;

pub use adapter::SchemaDelivery;
pub use config::{ConfigError, DeliveryConfig};
pub use document::{DocumentError, SdtDocument};
pub use registry::{DocumentRegistry, FsRegistry, InMemoryRegistry};
pub use resolver::{InlineResolver, PassthroughResolver, ReferenceResolver, ResolveError};
