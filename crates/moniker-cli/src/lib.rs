//! # moniker-cli: Schema Tooling for the Moniker DNS API
//!
//! Provides the `moniker-schema` command-line interface over the
//! [`moniker_schema`] crate.
//!
//! ## Subcommands
//!
//! - `moniker-schema validate <resource> <file>`: check an object against a
//!   resource schema and list every violation.
//! - `moniker-schema filter <resource> <file>`: print the object with every
//!   undeclared field removed.
//! - `moniker-schema resolve <ref>`: print the schema node a `$ref` names.
//! - `moniker-schema audit`: run the authoring checks over the catalogue.
//!
//! Input files are JSON, or YAML when the extension is `.yaml` / `.yml`.
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the input (or the catalogue, for `audit`) has
//! problems, `2` on operational errors.

pub mod audit;
pub mod filter;
pub mod resolve;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use moniker_schema::{CatalogueConfig, Instance, SchemaCatalogue};
use serde_json::Value;

/// Catalogue selection shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CatalogueOptions {
    /// YAML configuration file. Without one, the environment is consulted.
    pub config: Option<PathBuf>,
    /// Overrides the configured schema directory.
    pub schema_dir: Option<PathBuf>,
    /// Overrides the configured API version.
    pub api_version: Option<String>,
}

impl CatalogueOptions {
    /// Resolve the effective configuration: file or environment first,
    /// then command-line overrides.
    pub fn resolve(&self) -> Result<CatalogueConfig> {
        let mut config = match &self.config {
            Some(path) => CatalogueConfig::from_yaml_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => CatalogueConfig::from_env().context("invalid schema environment")?,
        };

        if let Some(dir) = &self.schema_dir {
            config.schema_dir = Some(dir.clone());
        }
        if let Some(version) = &self.api_version {
            config.api_version = version.clone();
        }
        Ok(config)
    }

    /// Build the catalogue these options select.
    pub fn load(&self) -> Result<SchemaCatalogue> {
        let config = self.resolve()?;
        SchemaCatalogue::new(&config)
            .with_context(|| format!("failed to load {} schema catalogue", config.api_version))
    }
}

/// Read an API object from a JSON or YAML file.
pub fn load_instance(path: &Path) -> Result<Instance> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let value: Value = if is_yaml(path) {
        serde_yaml::from_str(&content).with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))?
    };

    Ok(Instance::from(value))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
