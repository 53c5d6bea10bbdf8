//! # Uri Subcommand
//!
//! Prints the schema identity an editor would request for a document.

use anyhow::Result;
use clap::Args;

use sdt_core::DocumentLocator;
use sdt_delivery::protocol;

use crate::ConfigOverrides;

/// Arguments for the `sdt uri` subcommand.
#[derive(Args, Debug)]
pub struct UriArgs {
    /// Document locator (`file:///...` URL or path).
    #[arg(value_name = "LOCATOR")]
    pub locator: String,
}

/// Execute the uri subcommand.
///
/// Returns exit code: 0 if the locator names an SDT document, 1 otherwise.
pub fn run_uri(args: &UriArgs, overrides: &ConfigOverrides) -> Result<u8> {
    let config = overrides.resolve()?;
    match protocol::schema_uri(&config, &DocumentLocator::new(args.locator.as_str())) {
        Some(identity) => {
            println!("{identity}");
            Ok(0)
        }
        None => {
            eprintln!("not an SDT document: {}", args.locator);
            Ok(1)
        }
    }
}
