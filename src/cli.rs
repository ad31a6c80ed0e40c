use crate::config::Config;
use crate::manifest::Manifest;
use crate::openapi_builder::{build_openapi, OpenApiDocument};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::service::{self, ServeOptions};
use crate::source::load_sources;
use crate::type_resolver::TypeResolver;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// OpenAPI from registry - generate an OpenAPI 3 document from a route manifest and the Rust
/// types it references
#[derive(Parser, Debug)]
#[command(name = "openapi-from-registry")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest (YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Directory or file defining the model types (repeatable)
    #[arg(short = 's', long = "source", value_name = "SOURCE_DIR")]
    pub sources: Vec<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Serve the document over HTTP at this address instead of printing it
    #[arg(long = "serve", value_name = "ADDR", conflicts_with = "output_path")]
    pub serve: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest.is_file() {
        anyhow::bail!("Manifest does not exist: {}", args.manifest.display());
    }
    for source in &args.sources {
        if !source.exists() {
            anyhow::bail!("Source path does not exist: {}", source.display());
        }
    }

    info!("Manifest: {}", args.manifest.display());
    info!("Sources: {:?}", args.sources);
    match (&args.serve, &args.output_path) {
        (Some(addr), _) => info!("Serving at: {}", addr),
        (None, Some(output)) => info!("Output file: {}", output.display()),
        (None, None) => info!("Output: stdout"),
    }

    Ok(args)
}

/// Resolve the sources, load the manifest and assemble the document
pub fn generate(manifest: &Path, sources: &[PathBuf]) -> Result<(OpenApiDocument, Config)> {
    info!("Loading type definitions...");
    if sources.is_empty() {
        warn!("No source directories given; only builtin types can be referenced");
    }
    let parsed_files = load_sources(sources).context("Failed to load type definitions")?;
    info!("Parsed {} source files", parsed_files.len());
    let resolver = TypeResolver::new(&parsed_files);

    info!("Loading manifest...");
    let config = Manifest::from_path(manifest)
        .and_then(|manifest| manifest.into_config(&resolver))
        .with_context(|| format!("Failed to load manifest: {}", manifest.display()))?;

    info!("Building OpenAPI document...");
    let document = build_openapi(&config);
    Ok((document, config))
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");
    let (document, config) = generate(&args.manifest, &args.sources)?;

    if let Some(addr) = &args.serve {
        let options = ServeOptions {
            api_path: config.api_path.clone(),
            disable_cors: config.disable_cors,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        return runtime.block_on(service::serve(document, &options, addr));
    }

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Services: {}", config.web_services.len());
    info!("  - Paths: {}", document.paths.len());
    info!("  - Schemas: {}", document.components.schemas.len());

    Ok(())
}
