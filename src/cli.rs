use crate::annotations::Namespace;
use crate::config::{DuplicateOperationIdPolicy, OperationIdStrategy, ScanConfig};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Index to OpenAPI - generate OpenAPI documents from an annotated JAX-RS symbol index
#[derive(Parser, Debug)]
#[command(name = "index-to-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to an index file or a directory of index files
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// JAX-RS namespace to honour, repeatable (if not specified, auto-detect)
    #[arg(short = 'w', long = "framework", value_enum)]
    pub frameworks: Vec<Namespace>,

    /// What to do when two operations share an operationId
    #[arg(long = "duplicate-operation-ids", value_enum, default_value = "fail")]
    pub duplicate_operation_ids: DuplicateOperationIdPolicy,

    /// How operationIds are derived when none is declared
    #[arg(long = "operation-id-strategy", value_enum, default_value = "derived")]
    pub operation_id_strategy: OperationIdStrategy,

    /// Header parameter never documented, repeatable (replaces the defaults)
    #[arg(long = "ignore-header", value_name = "NAME")]
    pub ignored_headers: Vec<String>,

    /// Leave enums without constants untyped instead of rendering them as strings
    #[arg(long = "no-enum-fallback")]
    pub no_enum_fallback: bool,

    /// Title of the generated API
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// Version of the generated API
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

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

impl CliArgs {
    /// Scan configuration selected by the flags
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::default()
            .with_duplicate_policy(self.duplicate_operation_ids)
            .with_operation_id_strategy(self.operation_id_strategy);
        if !self.ignored_headers.is_empty() {
            config.ignored_header_parameter_names = self.ignored_headers.iter().cloned().collect();
        }
        config.default_enum_schema_fallback = !self.no_enum_fallback;
        config
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.index_path.exists() {
        anyhow::bail!("Index path does not exist: {}", args.index_path.display());
    }

    info!("Index path: {}", args.index_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if args.frameworks.is_empty() {
        info!("Framework: auto-detect");
    } else {
        info!("Framework: {:?}", args.frameworks);
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::loader::{IndexLoader, LoadedFile};
    use crate::scan::AnnotationScanner;
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    info!("Starting OpenAPI document generation...");

    // Step 1: Find index files
    let scanner = FileScanner::new(args.index_path.clone());
    let scan_result = scanner.scan()?;
    info!("Found {} index files", scan_result.index_files.len());

    if scan_result.index_files.is_empty() {
        anyhow::bail!("No index files found at {}", args.index_path.display());
    }

    // Step 2: Load them into one symbol index
    let loaded: Vec<LoadedFile> = IndexLoader::load_files(&scan_result.index_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(file) => Some(file),
            Err(e) => {
                debug!("Skipping index file: {:#}", e);
                None
            }
        })
        .collect();

    if loaded.is_empty() {
        anyhow::bail!("No index files could be loaded");
    }
    let file_count = loaded.len();
    let index = IndexLoader::into_index(loaded);
    info!("Loaded {} classes from {} files", index.len(), file_count);

    // Step 3: Scan
    let mut scanner = AnnotationScanner::new(args.scan_config()).with_info(
        args.title.clone(),
        args.api_version.clone(),
        None,
    );
    if !args.frameworks.is_empty() {
        scanner = scanner.with_namespaces(args.frameworks.clone());
    }
    let output = scanner.scan(&index)?;

    for diagnostic in &output.diagnostics {
        debug!("Diagnostic: {}", diagnostic);
    }

    // Step 4: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&output.document)?,
        OutputFormat::Json => serialize_json(&output.document)?,
    };

    // Step 5: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Index files loaded: {}", file_count);
    info!("  - Operations documented: {}", output.document.operations().count());
    info!("  - Diagnostics: {}", output.diagnostics.len());

    Ok(())
}
