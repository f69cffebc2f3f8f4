//! # Audit Subcommand
//!
//! Runs the catalogue authoring checks and prints one line per finding.

use anyhow::Result;
use clap::Args;
use moniker_schema::{audit_catalogue, SchemaCatalogue};

/// Arguments for the `moniker-schema audit` subcommand.
#[derive(Args, Debug, Default)]
pub struct AuditArgs {
    /// Only print the summary line.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Execute the audit subcommand.
///
/// Returns exit code: 0 for a clean catalogue, 1 if there are findings.
pub fn run_audit(args: &AuditArgs, catalogue: &SchemaCatalogue) -> Result<u8> {
    let findings = audit_catalogue(catalogue.store());

    if !args.quiet {
        for finding in &findings {
            println!("  FAIL: {finding}");
        }
    }
    println!(
        "Audit: {} document(s), {} finding(s)",
        catalogue.store().len(),
        findings.len()
    );

    Ok(u8::from(!findings.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_passes_audit() {
        let catalogue = SchemaCatalogue::builtin().unwrap();
        assert_eq!(run_audit(&AuditArgs::default(), &catalogue).unwrap(), 0);
    }

    #[test]
    fn broken_directory_catalogue_fails_audit() {
        let dir = tempfile::tempdir().unwrap();
        let version_dir = dir.path().join("v1");
        std::fs::create_dir_all(&version_dir).unwrap();
        for name in ["domain", "domains", "record", "records", "server", "servers", "tsigkey", "tsigkeys"] {
            let doc = serde_json::json!({
                "id": format!("/schemas/{name}"),
                "properties": {"children": {"type": "array"}}
            });
            std::fs::write(version_dir.join(format!("{name}.json")), doc.to_string()).unwrap();
        }

        let config = moniker_schema::CatalogueConfig {
            api_version: "v1".to_string(),
            schema_dir: Some(dir.path().to_path_buf()),
        };
        let catalogue = SchemaCatalogue::new(&config).unwrap();
        assert_eq!(run_audit(&AuditArgs { quiet: true }, &catalogue).unwrap(), 1);
    }
}
