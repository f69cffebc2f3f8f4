//! # Resolve Subcommand
//!
//! Prints the schema node a `$ref` points at, e.g.
//! `moniker-schema resolve '/schemas/domain#/properties/name'`.

use anyhow::{Context, Result};
use clap::Args;
use moniker_schema::SchemaCatalogue;

/// Arguments for the `moniker-schema resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Reference to resolve: `<uri>#<json-pointer>`.
    #[arg(value_name = "REF")]
    pub reference: String,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, catalogue: &SchemaCatalogue) -> Result<u8> {
    let node = catalogue
        .resolver()
        .resolve(&args.reference)
        .with_context(|| format!("cannot resolve {}", args.reference))?;

    println!(
        "{}",
        serde_json::to_string_pretty(node).context("failed to serialize schema node")?
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_pointer() {
        let catalogue = SchemaCatalogue::builtin().unwrap();
        let args = ResolveArgs {
            reference: "/schemas/record#/properties/type".to_string(),
        };
        assert_eq!(run_resolve(&args, &catalogue).unwrap(), 0);
    }

    #[test]
    fn resolve_unknown_document() {
        let catalogue = SchemaCatalogue::builtin().unwrap();
        let args = ResolveArgs {
            reference: "/schemas/zone#".to_string(),
        };
        let err = run_resolve(&args, &catalogue).unwrap_err();
        assert!(format!("{err:#}").contains("/schemas/zone"));
    }
}
