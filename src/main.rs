//! Index to OpenAPI - command-line tool for generating OpenAPI documentation.
//!
//! Reads a symbol index describing an annotated JAX-RS program and writes an OpenAPI 3.0
//! document for its resources.
//!
//! # Usage
//!
//! ```bash
//! index-to-openapi [OPTIONS] <INDEX_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! index-to-openapi ./build/index -o openapi.yaml
//! ```
//!
//! Generate JSON documentation, skipping operations with duplicate identifiers:
//! ```bash
//! index-to-openapi ./build/index -f json --duplicate-operation-ids permissive
//! ```

use anyhow::Result;
use clap::Parser;
use index_to_openapi::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists, validate after
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("index-to-openapi starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
