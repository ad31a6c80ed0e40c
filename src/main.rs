//! OpenAPI from registry - command-line front end.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-registry [OPTIONS] <MANIFEST>
//! ```
//!
//! Generate YAML from a manifest and the models under `src/models`:
//! ```bash
//! openapi-from-registry routes.yaml -s src/models -o openapi.yaml
//! ```
//!
//! Serve the document at the manifest's `api_path`:
//! ```bash
//! openapi-from-registry routes.yaml -s src/models --serve 127.0.0.1:8080
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_registry::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from registry starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
