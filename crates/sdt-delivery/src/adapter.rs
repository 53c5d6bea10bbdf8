//! # Schema Delivery Adapter
//!
//! Answers the editor's schema requests for SDT documents.
//!
//! ## Content request flow
//!
//! 1. Decode the identity into a document path; foreign identities get no
//!    answer.
//! 2. Fetch the text from the registry and parse it.
//! 3. Fingerprint `schemas.output` and consult the cache.
//! 4. On a miss: dereference (bounded by the configured timeout), augment
//!    under the template pointer, wrap in the base meta-schema, serialize,
//!    store.
//!
//! ## Degradation
//!
//! The editor always gets a schema for an SDT identity. Anything that
//! prevents augmentation yields the base meta-schema without `template`:
//!
//! | Situation                     | Cached?                             |
//! |-------------------------------|-------------------------------------|
//! | document not in the registry  | no                                  |
//! | document is not YAML          | no                                  |
//! | no `schemas.output`           | yes, under the absent-output fingerprint |
//! | output schema not loadable    | yes, under its fingerprint          |
//! | template pointer unusable     | yes, under the output fingerprint   |
//! | resolver error or timeout     | no, so the next request retries     |

use std::sync::Arc;

use sdt_core::{fingerprint, DocumentLocator, SchemaIdentity};
use sdt_schema::{
    augment_schema, base_meta_schema, check_template_pointer, document_schema_at,
    AugmentationCache,
};
use serde_json::Value;

use crate::config::DeliveryConfig;
use crate::document::SdtDocument;
use crate::protocol;
use crate::registry::DocumentRegistry;
use crate::resolver::ReferenceResolver;

/// Result of building a document schema for one output schema.
#[derive(Debug)]
enum Outcome {
    /// The base meta-schema with the augmented `template`.
    Augmented(Value),
    /// The base meta-schema only. `cacheable` is false for failures that
    /// may go away on retry.
    Base { cacheable: bool },
}

/// Serves document schemas for SDT documents.
pub struct SchemaDelivery<R> {
    config: DeliveryConfig,
    registry: Arc<dyn DocumentRegistry>,
    resolver: R,
    cache: Arc<AugmentationCache>,
}

impl<R> std::fmt::Debug for SchemaDelivery<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDelivery")
            .field("config", &self.config)
            .field("registry", &self.registry.registry_name())
            .field("cache_entries", &self.cache.len())
            .finish()
    }
}

impl<R: ReferenceResolver> SchemaDelivery<R> {
    /// Assemble an adapter from its collaborators.
    pub fn new(
        config: DeliveryConfig,
        registry: Arc<dyn DocumentRegistry>,
        resolver: R,
        cache: Arc<AugmentationCache>,
    ) -> Self {
        Self {
            config,
            registry,
            resolver,
            cache,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// The shared augmentation cache.
    pub fn cache(&self) -> &Arc<AugmentationCache> {
        &self.cache
    }

    /// Schema identity for the document at `locator`, if it is an SDT
    /// document.
    pub fn schema_uri(&self, locator: &DocumentLocator) -> Option<SchemaIdentity> {
        protocol::schema_uri(&self.config, locator)
    }

    /// Serialized document schema for `identity`, or `None` if the
    /// identity does not use the configured scheme.
    pub async fn schema_content(&self, identity: &SchemaIdentity) -> Option<Arc<str>> {
        let path = protocol::document_path(&self.config, identity)?;

        let Some(text) = self.registry.document_text(&path) else {
            tracing::warn!(%identity, registry = self.registry.registry_name(), "document not found; serving base schema");
            return base_schema();
        };

        let document = match SdtDocument::parse(&text) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(%identity, error = %e, "unparsable document; serving base schema");
                return base_schema();
            }
        };

        let output = document.output_schema().cloned().unwrap_or(Value::Null);
        let fp = match fingerprint(&output) {
            Ok(fp) => Some(fp),
            Err(e) => {
                tracing::warn!(%identity, error = %e, "cannot fingerprint output schema; not caching");
                None
            }
        };

        if let Some(hit) = fp.and_then(|fp| self.cache.lookup(identity, &fp)) {
            return Some(hit);
        }

        let (schema, cacheable) = match self.build(identity, &output).await {
            Outcome::Augmented(schema) => (schema, true),
            Outcome::Base { cacheable } => (base_meta_schema(), cacheable),
        };
        let serialized = serialize(&schema)?;

        match fp {
            Some(fp) if cacheable => Some(self.cache.store(identity.clone(), fp, serialized)),
            _ => Some(Arc::from(serialized)),
        }
    }

    async fn build(&self, identity: &SchemaIdentity, output: &Value) -> Outcome {
        if output.is_null() {
            tracing::debug!(%identity, "no output schema; serving base schema");
            return Outcome::Base { cacheable: true };
        }
        if let Err(e) = check_template_pointer(&self.config.template_pointer) {
            tracing::warn!(%identity, error = %e, "unusable template pointer; serving base schema");
            return Outcome::Base { cacheable: true };
        }

        let resolved = match tokio::time::timeout(
            self.config.resolve_timeout,
            self.resolver.dereference(output.clone()),
        )
        .await
        {
            Ok(Ok(resolved)) => resolved,
            Ok(Err(e)) => {
                tracing::warn!(%identity, error = %e, "dereferencing failed; serving base schema");
                return Outcome::Base { cacheable: false };
            }
            Err(_) => {
                tracing::warn!(
                    %identity,
                    timeout = ?self.config.resolve_timeout,
                    "dereferencing timed out; serving base schema"
                );
                return Outcome::Base { cacheable: false };
            }
        };

        match augment_schema(&resolved, &self.config.template_pointer) {
            Ok(template) => {
                tracing::debug!(%identity, "augmented output schema");
                Outcome::Augmented(document_schema_at(template, &self.config.template_pointer))
            }
            Err(e) => {
                tracing::warn!(%identity, error = %e, "output schema not augmentable; serving base schema");
                Outcome::Base { cacheable: true }
            }
        }
    }
}

fn base_schema() -> Option<Arc<str>> {
    serialize(&base_meta_schema()).map(Arc::from)
}

fn serialize(schema: &Value) -> Option<String> {
    match serde_json::to_string(schema) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(error = %e, "schema serialization failed");
            None
        }
    }
}
