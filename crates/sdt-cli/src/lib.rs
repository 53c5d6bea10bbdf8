//! # sdt-cli — Command-Line Front End
//!
//! Provides the `sdt` command, which exposes the editor schema protocol
//! outside the editor:
//!
//! - `sdt uri` — the schema identity of a document locator.
//! - `sdt schema` — the augmented document schema for a document on disk.
//! - `sdt validate` — validate documents against their own schema.
//!
//! ```bash
//! sdt schema reports/monthly.sdt.yaml --pretty
//! sdt validate reports/*.sdt.yaml
//! ```
//!
//! Handlers return an exit code (0 ok, 1 failure) and reserve `Err` for
//! operational errors.

pub mod schema;
pub mod uri;
pub mod validate;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use sdt_core::{DocumentLocator, SchemaIdentity};
use sdt_delivery::{
    DeliveryConfig, FsRegistry, InlineResolver, PassthroughResolver, ReferenceResolver,
    SchemaDelivery,
};
use sdt_schema::AugmentationCache;

/// Global flags overriding `SDT_*` environment configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// URI scheme for schema identities.
    #[arg(long, global = true, value_name = "SCHEME")]
    pub scheme: Option<String>,

    /// File suffix that marks SDT documents.
    #[arg(long, global = true, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Dereferencing timeout in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Environment configuration with these overrides applied.
    pub fn resolve(&self) -> Result<DeliveryConfig> {
        let mut config = DeliveryConfig::from_env().context("invalid SDT_* configuration")?;
        if let Some(scheme) = &self.scheme {
            config.scheme = scheme.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.document_suffix = suffix.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.resolve_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// How output schemas are dereferenced before augmentation.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolverKind {
    /// Inline local references; remote references degrade to the base schema.
    #[default]
    Inline,
    /// Leave references to the augmentation engine.
    Passthrough,
}

/// Serve the document schema for the document at `path` from disk.
///
/// # Errors
///
/// Fails if `path` is not valid UTF-8 or does not carry the configured
/// document suffix.
pub fn document_schema(
    config: &DeliveryConfig,
    path: &Path,
    resolver: ResolverKind,
) -> Result<(SchemaIdentity, Arc<str>)> {
    match resolver {
        ResolverKind::Inline => serve(config, path, InlineResolver),
        ResolverKind::Passthrough => serve(config, path, PassthroughResolver),
    }
}

fn serve<R: ReferenceResolver>(
    config: &DeliveryConfig,
    path: &Path,
    resolver: R,
) -> Result<(SchemaIdentity, Arc<str>)> {
    let locator = path
        .to_str()
        .map(DocumentLocator::new)
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))?;

    let delivery = SchemaDelivery::new(
        config.clone(),
        Arc::new(FsRegistry::new()),
        resolver,
        Arc::new(AugmentationCache::new()),
    );

    let identity = delivery.schema_uri(&locator).with_context(|| {
        format!(
            "{} is not an SDT document (expected suffix '{}')",
            path.display(),
            config.document_suffix
        )
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let content = runtime
        .block_on(delivery.schema_content(&identity))
        .with_context(|| format!("no schema served for {identity}"))?;

    Ok((identity, content))
}
