//! # Validate Subcommand
//!
//! Checks an API object against a resource schema and reports every
//! violation in one pass, the way the API reports them to its callers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use moniker_schema::{ResourceKind, SchemaCatalogue, SchemaError, ValidationError};

/// Arguments for the `moniker-schema validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resource schema to validate against (domain, records, tsigkey, ...).
    #[arg(value_name = "RESOURCE")]
    pub resource: ResourceKind,

    /// JSON or YAML file holding the object.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print violations as a JSON array instead of one per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the object conforms, 1 if it does not.
pub fn run_validate(args: &ValidateArgs, catalogue: &SchemaCatalogue) -> Result<u8> {
    let instance = crate::load_instance(&args.file)?;
    let document = catalogue.document(args.resource)?;

    match document.validate(&instance) {
        Ok(()) => {
            if args.json {
                println!("[]");
            } else {
                println!("OK: {} conforms to {}", args.file.display(), args.resource);
            }
            Ok(0)
        }
        Err(SchemaError::InvalidObject { errors }) => {
            println!("{}", render_errors(&errors, args.json)?);
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("cannot validate against {}", args.resource)),
    }
}

/// Render violations one per line (`path: message [validator]`), or as a
/// JSON array of `{path, message, validator}`.
pub fn render_errors(errors: &[ValidationError], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(errors).context("failed to serialize errors");
    }

    let mut out: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
    out.insert(0, format!("FAIL: {} violation(s)", errors.len()));
    Ok(out.join("\n"))
}
