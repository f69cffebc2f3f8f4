//! # moniker-schema CLI entry point
//!
//! Parses command-line arguments, loads the schema catalogue once, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moniker_cli::audit::{run_audit, AuditArgs};
use moniker_cli::filter::{run_filter, FilterArgs};
use moniker_cli::resolve::{run_resolve, ResolveArgs};
use moniker_cli::validate::{run_validate, ValidateArgs};
use moniker_cli::CatalogueOptions;

/// Moniker DNS API schema tooling.
///
/// Validates and filters API objects against the resource schemas,
/// resolves schema references, and audits the schema catalogue.
#[derive(Parser, Debug)]
#[command(name = "moniker-schema", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read schemas from <DIR>/<version>/<name>.json instead of the embedded copies.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    /// API version whose schemas are loaded.
    #[arg(long, global = true)]
    api_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an object against a resource schema.
    Validate(ValidateArgs),

    /// Print an object with every field the schema does not declare removed.
    Filter(FilterArgs),

    /// Print the schema node a $ref points at.
    Resolve(ResolveArgs),

    /// Check the schema catalogue for authoring problems.
    Audit(AuditArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = CatalogueOptions {
        config: cli.config,
        schema_dir: cli.schema_dir,
        api_version: cli.api_version,
    };

    let result = options.load().and_then(|catalogue| {
        tracing::info!(version = catalogue.version(), "schema catalogue loaded");
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &catalogue),
            Commands::Filter(args) => run_filter(args, &catalogue),
            Commands::Resolve(args) => run_resolve(args, &catalogue),
            Commands::Audit(args) => run_audit(args, &catalogue),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
