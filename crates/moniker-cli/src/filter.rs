//! # Filter Subcommand
//!
//! Prints an API object projected onto a resource schema: undeclared
//! fields are dropped, declared but absent ones appear as `null`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use moniker_schema::{ResourceKind, SchemaCatalogue};

/// Arguments for the `moniker-schema filter` subcommand.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Resource schema to filter against.
    #[arg(value_name = "RESOURCE")]
    pub resource: ResourceKind,

    /// JSON or YAML file holding the object.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the filter subcommand.
pub fn run_filter(args: &FilterArgs, catalogue: &SchemaCatalogue) -> Result<u8> {
    println!("{}", filter_to_string(args, catalogue)?);
    Ok(0)
}

/// The filtered object as pretty-printed JSON.
pub fn filter_to_string(args: &FilterArgs, catalogue: &SchemaCatalogue) -> Result<String> {
    let instance = crate::load_instance(&args.file)?;
    let filtered = catalogue
        .document(args.resource)?
        .filter(&instance)
        .with_context(|| format!("cannot filter against {}", args.resource))?;

    serde_json::to_string_pretty(&filtered).context("failed to serialize filtered object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn filter_drops_undeclared_fields() {
        let catalogue = SchemaCatalogue::builtin().unwrap();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: ns1.example.com.\ninternal_host: 10.0.0.1").unwrap();

        let args = FilterArgs {
            resource: ResourceKind::Server,
            file: file.path().to_path_buf(),
        };
        let out: serde_json::Value = serde_json::from_str(&filter_to_string(&args, &catalogue).unwrap()).unwrap();
        assert_eq!(out["name"], "ns1.example.com.");
        assert!(out.get("internal_host").is_none());
        assert!(out["id"].is_null());
    }

    #[test]
    fn filter_collection() {
        let catalogue = SchemaCatalogue::builtin().unwrap();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"records": [{{"id": "1", "type": "A", "junk": "x"}}], "page": 2}}"#
        )
        .unwrap();

        let args = FilterArgs {
            resource: ResourceKind::Records,
            file: file.path().to_path_buf(),
        };
        let out: serde_json::Value = serde_json::from_str(&filter_to_string(&args, &catalogue).unwrap()).unwrap();
        assert!(out.get("page").is_none());
        assert_eq!(out["records"][0]["type"], "A");
        assert!(out["records"][0].get("junk").is_none());
        assert_eq!(run_filter(&args, &catalogue).unwrap(), 0);
    }
}
