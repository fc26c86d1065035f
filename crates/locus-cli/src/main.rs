//! Locus - source resolution from the command line
//!
//! Usage:
//!   locus resolve <URI>                      # Resolve an absolute URI
//!   locus resolve <REF> --relative-to <URI>  # Resolve a reference against a source
//!   locus read <URI>                         # Print the source text
//!   locus config                             # Show the resolver chain

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locus_core::config::ConfigStore;
use locus_core::engine::AnalysisEngine;
use locus_core::logging::TracingLogger;
use locus_core::source::{Source, SourceFactory};

#[derive(Parser)]
#[command(name = "locus")]
#[command(about = "Resolve import URIs to sources", long_about = None)]
struct Cli {
    /// Path to locus.toml (defaults to ./locus.toml, then the global config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URI and describe the resulting source
    Resolve {
        /// Absolute URI, or a reference when --relative-to is given
        uri: String,

        /// Containing source to resolve the reference against
        #[arg(long)]
        relative_to: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the current text of a source
    Read {
        /// Absolute URI
        uri: String,
    },

    /// Show the effective resolver chain
    Config,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Serialize)]
struct SourceReport {
    uri: String,
    path: PathBuf,
    exists: bool,
    system_library: bool,
}

impl From<&Source> for SourceReport {
    fn from(source: &Source) -> Self {
        Self {
            uri: source.encoding().to_string(),
            path: source.path().to_path_buf(),
            exists: source.exists(),
            system_library: source.is_in_system_library(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = ConfigStore::from_current_dir(cli.config)?;
    let config = store.load()?;
    let engine = AnalysisEngine::from_config(&config)?;
    engine.set_logger(Some(Arc::new(TracingLogger)));

    match cli.command {
        Commands::Resolve {
            uri,
            relative_to,
            format,
        } => run_resolve(&engine, &uri, relative_to.as_deref(), format),
        Commands::Read { uri } => run_read(&engine, &uri),
        Commands::Config => {
            match store.config_path() {
                Some(path) => println!("Config: {}", path.display()),
                None => println!("Config: (defaults)"),
            }
            let order: Vec<&str> = config.resolver_order().iter().map(|k| k.as_str()).collect();
            println!("Resolvers: {}", order.join(" -> "));
            Ok(())
        }
    }
}

fn active_factory(engine: &AnalysisEngine) -> Result<SourceFactory> {
    engine
        .source_factory()
        .ok_or_else(|| anyhow::anyhow!("No source factory configured"))
}

fn run_resolve(
    engine: &AnalysisEngine,
    uri: &str,
    relative_to: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let factory = active_factory(engine)?;

    let source = match relative_to {
        Some(base) => {
            let containing = factory
                .resolve_str(base)
                .with_context(|| format!("Failed to resolve containing source {}", base))?;
            factory.resolve_relative(&containing, uri)
        }
        None => factory.resolve_str(uri),
    }
    .with_context(|| format!("Failed to resolve {}", uri))?;

    let report = SourceReport::from(&source);
    match format {
        OutputFormat::Table => {
            println!("URI:     {}", report.uri);
            println!("Path:    {}", report.path.display());
            println!("Exists:  {}", if report.exists { "yes" } else { "no" });
            if report.system_library {
                println!("System:  yes");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_read(engine: &AnalysisEngine, uri: &str) -> Result<()> {
    let factory = active_factory(engine)?;
    let source = factory
        .resolve_str(uri)
        .with_context(|| format!("Failed to resolve {}", uri))?;

    match source.contents() {
        Ok(text) => {
            print!("{text}");
            Ok(())
        }
        Err(err) => {
            engine
                .logger()
                .log_error_with(&format!("Failed to read {}", source), &err);
            Err(err.into())
        }
    }
}
