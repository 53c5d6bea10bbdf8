//! # Schema Subcommand
//!
//! Prints (or writes) the document schema an editor would receive for a
//! document on disk: the base meta-schema plus the augmented `template`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::{document_schema, ConfigOverrides, ResolverKind};

/// Arguments for the `sdt schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Path to the SDT document.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// How the output schema is dereferenced.
    #[arg(long, value_enum, default_value_t = ResolverKind::Inline)]
    pub resolver: ResolverKind,

    /// Pretty-print the schema.
    #[arg(long)]
    pub pretty: bool,

    /// Write the schema to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the schema subcommand.
///
/// Returns exit code 0; failures to locate or serve the document are
/// operational errors.
pub fn run_schema(args: &SchemaArgs, overrides: &ConfigOverrides) -> Result<u8> {
    let config = overrides.resolve()?;
    let (identity, content) = document_schema(&config, &args.path, args.resolver)?;
    tracing::info!(%identity, bytes = content.len(), "served document schema");

    let rendered = if args.pretty {
        let value: Value = serde_json::from_str(&content).context("served schema is not JSON")?;
        serde_json::to_string_pretty(&value)?
    } else {
        content.to_string()
    };

    match &args.output {
        Some(out) => {
            std::fs::write(out, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote schema for {identity} to {}", out.display());
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}
