//! # sdt CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sdt_cli::schema::{run_schema, SchemaArgs};
use sdt_cli::uri::{run_uri, UriArgs};
use sdt_cli::validate::{run_validate, ValidateArgs};
use sdt_cli::ConfigOverrides;

/// SDT schema toolchain.
///
/// Derives directive-aware JSON Schemas for SDT templates from their
/// output schemas, and validates documents against them.
#[derive(Parser, Debug)]
#[command(name = "sdt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the schema URI for a document locator.
    Uri(UriArgs),

    /// Print the augmented document schema for an SDT document.
    Schema(SchemaArgs),

    /// Validate SDT documents against their augmented schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries schemas.
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "sdt CLI starting");

    let result = match cli.command {
        Commands::Uri(args) => run_uri(&args, &cli.overrides),
        Commands::Schema(args) => run_schema(&args, &cli.overrides),
        Commands::Validate(args) => run_validate(&args, &cli.overrides),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
