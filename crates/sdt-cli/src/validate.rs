//! # Validate Subcommand
//!
//! Validates SDT documents against the schema the editor would serve for
//! them, so CI catches what the editor underlines.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use sdt_delivery::DeliveryConfig;
use sdt_schema::{SchemaValidationError, TemplateValidator};

use crate::{document_schema, ConfigOverrides, ResolverKind};

/// Arguments for the `sdt validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// SDT documents to validate.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// How output schemas are dereferenced.
    #[arg(long, value_enum, default_value_t = ResolverKind::Inline)]
    pub resolver: ResolverKind,
}

/// Outcome of validating a set of documents.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Number of documents checked.
    pub total: usize,
    /// Number that conformed.
    pub passed: usize,
    /// Failing documents and why.
    pub failures: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// True if every document conformed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if every document conforms, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, overrides: &ConfigOverrides) -> Result<u8> {
    let config = overrides.resolve()?;
    let report = validate_documents(&config, &args.paths, args.resolver)?;

    println!("Documents: {}/{} passed", report.passed, report.total);
    for (path, error) in &report.failures {
        println!("  FAIL: {}: {}", path.display(), error);
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Validate each document in `paths` against its served schema.
///
/// # Errors
///
/// Returns an error only if a path is not an SDT document; unreadable or
/// non-conforming documents are reported as failures.
pub fn validate_documents(
    config: &DeliveryConfig,
    paths: &[PathBuf],
    resolver: ResolverKind,
) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    for path in paths {
        report.total += 1;
        match validate_document(config, path, resolver)? {
            None => report.passed += 1,
            Some(reason) => report.failures.push((path.clone(), reason)),
        }
    }

    Ok(report)
}

/// `None` if the document conforms, otherwise the reason it does not.
fn validate_document(
    config: &DeliveryConfig,
    path: &Path,
    resolver: ResolverKind,
) -> Result<Option<String>> {
    let (identity, content) = document_schema(config, path, resolver)?;
    let schema: Value = serde_json::from_str(&content)
        .with_context(|| format!("schema served for {identity} is not JSON"))?;
    if schema.pointer(&config.template_pointer.to_json_pointer()).is_none() {
        tracing::warn!(%identity, "no template schema available; checking schemas section only");
    }

    let validator = match TemplateValidator::new(identity.as_str(), &schema) {
        Ok(validator) => validator,
        Err(e) => return Ok(Some(e.to_string())),
    };

    match validator.validate_file(path) {
        Ok(()) => Ok(None),
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            let lines: Vec<String> = violations
                .violations()
                .iter()
                .map(|v| v.to_string().trim().to_string())
                .collect();
            Ok(Some(lines.join("; ")))
        }
        Err(e) => Ok(Some(e.to_string())),
    }
}
