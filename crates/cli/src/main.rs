use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use report::{print_json, summary_line, ExtractReport};
use scan::SourceScanner;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use typex_go_frontend::GoParser;
use typex_graph::{Extraction, Extractor, ExtractorConfig, GraphError};

mod report;
mod scan;

#[derive(Parser)]
#[command(name = "typex")]
#[command(about = "Extract Go type declarations into a queryable type graph", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Extractor configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the type graph and print it with diagnostics and stats
    Extract(SourceArgs),

    /// Print the flattened field view of a struct
    Fields {
        #[command(flatten)]
        sources: SourceArgs,

        /// Struct type name
        #[arg(long = "type")]
        type_name: String,
    },

    /// Print the method set of an interface
    Methods {
        #[command(flatten)]
        sources: SourceArgs,

        /// Interface type name
        #[arg(long = "type")]
        type_name: String,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Go files or directories to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also read `_test.go` files
    #[arg(long)]
    include_tests: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExtractorConfig::default(),
    };
    let extractor = Extractor::new(config).context("Invalid extractor configuration")?;

    match cli.command {
        Commands::Extract(sources) => {
            let extraction = run_extraction(&extractor, &sources)?;
            print_json(&ExtractReport::new(&extraction))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fields { sources, type_name } => {
            let extraction = run_extraction(&extractor, &sources)?;
            let query = extractor.query(&extraction.graph);
            match query.flattened_fields(&type_name) {
                Ok(view) => {
                    if let Some(cycle) = view.cycle_diagnostic() {
                        log::warn!("{cycle}");
                    }
                    print_json(&view)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => report_query_error(err),
            }
        }
        Commands::Methods { sources, type_name } => {
            let extraction = run_extraction(&extractor, &sources)?;
            let query = extractor.query(&extraction.graph);
            match query.method_set(&type_name) {
                Ok(set) => {
                    print_json(&set)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => report_query_error(err),
            }
        }
    }
}

fn load_config(path: &Path) -> Result<ExtractorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ExtractorConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}

/// Scan, parse every file as its own unit, then run the multi-unit pipeline
fn run_extraction(extractor: &Extractor, sources: &SourceArgs) -> Result<Extraction> {
    let files = SourceScanner::new(sources.include_tests).scan(&sources.paths)?;

    let mut parser = GoParser::new().context("Failed to initialise Go parser")?;
    let mut units = Vec::with_capacity(files.len());
    for file in &files {
        match parser.parse_file(file) {
            Ok(unit) => units.push(unit),
            Err(e) => log::warn!("Skipping {}: {e}", file.display()),
        }
    }

    let extraction = extractor.extract_units(units);
    log::info!(
        "{}",
        summary_line(&extraction.stats(), extraction.diagnostics.len())
    );
    Ok(extraction)
}

/// Unknown names are reported as a `NotFound` diagnostic on stdout
fn report_query_error(err: GraphError) -> Result<ExitCode> {
    match err.to_diagnostic() {
        Some(diagnostic) => {
            print_json(&diagnostic)?;
            Ok(ExitCode::FAILURE)
        }
        None => Err(err.into()),
    }
}
