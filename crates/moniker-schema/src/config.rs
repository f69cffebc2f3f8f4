//! Schema catalogue configuration.
//!
//! Selects the API version whose schemas are loaded and, optionally, a
//! directory to read them from instead of the embedded copies. Defaults
//! load the embedded v1 catalogue. Override via environment variables, a
//! YAML file, or explicit construction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::loader::{SchemaLoader, EMBEDDED_VERSION};

/// Environment variable naming the API version.
pub const VERSION_ENV: &str = "MONIKER_SCHEMA_VERSION";
/// Environment variable naming a schema directory.
pub const SCHEMA_DIR_ENV: &str = "MONIKER_SCHEMA_DIR";

/// Where the catalogue comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogueConfig {
    /// API version directory name (`v1`).
    pub api_version: String,
    /// Root of a `<version>/<name>.json` tree. `None` uses the embedded
    /// documents.
    pub schema_dir: Option<PathBuf>,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            api_version: EMBEDDED_VERSION.to_string(),
            schema_dir: None,
        }
    }
}

impl CatalogueConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MONIKER_SCHEMA_VERSION` (default: `v1`)
    /// - `MONIKER_SCHEMA_DIR` (default: unset, embedded documents)
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if a variable is set but empty.
    pub fn from_env() -> Result<Self, SchemaError> {
        Ok(Self {
            api_version: env_or(VERSION_ENV, EMBEDDED_VERSION)?,
            schema_dir: env_opt(SCHEMA_DIR_ENV)?.map(PathBuf::from),
        })
    }

    /// Read configuration from a YAML file. Missing keys take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read and
    /// [`SchemaError::Config`] if it is not a valid configuration.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| SchemaError::Config(format!("{}: {e}", path.display())))?;

        if config.api_version.trim().is_empty() {
            return Err(SchemaError::Config(format!(
                "{}: api_version must not be empty",
                path.display()
            )));
        }
        Ok(config)
    }

    /// The loader this configuration selects.
    pub fn loader(&self) -> SchemaLoader {
        match &self.schema_dir {
            Some(dir) => SchemaLoader::Directory(dir.clone()),
            None => SchemaLoader::Embedded,
        }
    }
}

fn env_opt(var: &str) -> Result<Option<String>, SchemaError> {
    match std::env::var(var) {
        Ok(value) if value.trim().is_empty() => {
            Err(SchemaError::Config(format!("{var} is set but empty")))
        }
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

fn env_or(var: &str, default: &str) -> Result<String, SchemaError> {
    Ok(env_opt(var)?.unwrap_or_else(|| default.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_embedded_v1() {
        let cfg = CatalogueConfig::default();
        assert_eq!(cfg.api_version, "v1");
        assert!(matches!(cfg.loader(), SchemaLoader::Embedded));
    }

    #[test]
    fn env_or_uses_default_when_var_absent() {
        assert_eq!(env_or("NONEXISTENT_MONIKER_VAR_12345", "v1").unwrap(), "v1");
    }

    #[test]
    fn env_opt_rejects_empty_value() {
        std::env::set_var("TEST_EMPTY_MONIKER_VAR", "  ");
        let result = env_opt("TEST_EMPTY_MONIKER_VAR");
        std::env::remove_var("TEST_EMPTY_MONIKER_VAR");
        assert!(matches!(result, Err(SchemaError::Config(_))));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_version: v2\nschema_dir: /srv/schemas").unwrap();
        let cfg = CatalogueConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.api_version, "v2");
        assert_eq!(cfg.schema_dir, Some(PathBuf::from("/srv/schemas")));
        assert!(matches!(cfg.loader(), SchemaLoader::Directory(_)));
    }

    #[test]
    fn yaml_file_missing_keys_take_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "schema_dir: ./schemas").unwrap();
        let cfg = CatalogueConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.api_version, "v1");
    }

    #[test]
    fn yaml_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_verison: v2").unwrap();
        let err = CatalogueConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn yaml_file_rejects_empty_version() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_version: \"\"").unwrap();
        assert!(CatalogueConfig::from_yaml_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CatalogueConfig::from_yaml_file("/nonexistent/moniker.yaml").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
