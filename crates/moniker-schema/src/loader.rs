//! # Schema Loading
//!
//! Produces parsed schema documents for `(version, name)` pairs. The
//! v1 resource schemas are compiled into the crate; a directory laid out as
//! `<dir>/<version>/<name>.json` can be used instead, e.g. to try schema
//! changes without a rebuild.
//!
//! Loading happens once while the catalogue is built. Nothing downstream of
//! the [`ReferenceStore`](crate::store::ReferenceStore) touches the filesystem.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SchemaError;

/// API version whose documents are embedded in the crate.
pub const EMBEDDED_VERSION: &str = "v1";

const EMBEDDED_V1: &[(&str, &str)] = &[
    ("domain", include_str!("../schemas/v1/domain.json")),
    ("domains", include_str!("../schemas/v1/domains.json")),
    ("record", include_str!("../schemas/v1/record.json")),
    ("records", include_str!("../schemas/v1/records.json")),
    ("server", include_str!("../schemas/v1/server.json")),
    ("servers", include_str!("../schemas/v1/servers.json")),
    ("tsigkey", include_str!("../schemas/v1/tsigkey.json")),
    ("tsigkeys", include_str!("../schemas/v1/tsigkeys.json")),
];

/// Where schema documents come from.
#[derive(Debug, Clone, Default)]
pub enum SchemaLoader {
    /// Documents compiled into the crate.
    #[default]
    Embedded,
    /// Documents read from `<root>/<version>/<name>.json`.
    Directory(PathBuf),
}

impl SchemaLoader {
    /// Load and parse the document for `name` under `version`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the document does not exist or
    /// is not valid JSON.
    pub fn load(&self, version: &str, name: &str) -> Result<Value, SchemaError> {
        match self {
            SchemaLoader::Embedded => load_embedded(version, name),
            SchemaLoader::Directory(root) => load_from_dir(root, version, name),
        }
    }
}

fn load_embedded(version: &str, name: &str) -> Result<Value, SchemaError> {
    if version != EMBEDDED_VERSION {
        return Err(SchemaError::SchemaLoad {
            name: name.to_string(),
            reason: format!("no embedded schemas for API version {version:?}"),
        });
    }

    let source = EMBEDDED_V1
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, src)| *src)
        .ok_or_else(|| SchemaError::SchemaLoad {
            name: name.to_string(),
            reason: "no embedded schema with this name".to_string(),
        })?;

    serde_json::from_str(source).map_err(|e| SchemaError::SchemaLoad {
        name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

fn load_from_dir(root: &Path, version: &str, name: &str) -> Result<Value, SchemaError> {
    let path = root.join(version).join(format!("{name}.json"));

    let content = std::fs::read_to_string(&path).map_err(|e| SchemaError::SchemaLoad {
        name: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
        name: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_documents_parse() {
        for (name, _) in EMBEDDED_V1 {
            let doc = SchemaLoader::Embedded.load("v1", name).unwrap();
            assert!(doc.get("properties").is_some(), "{name} has no properties");
        }
    }

    #[test]
    fn test_embedded_unknown_version() {
        let err = SchemaLoader::Embedded.load("v2", "domain").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }

    #[test]
    fn test_embedded_unknown_name() {
        let err = SchemaLoader::Embedded.load("v1", "zone").unwrap_err();
        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_directory_loader_reads_versioned_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("v1")).unwrap();
        std::fs::write(
            tmp.path().join("v1/domain.json"),
            r#"{"properties": {"name": {"type": "string"}}}"#,
        )
        .unwrap();

        let loader = SchemaLoader::Directory(tmp.path().to_path_buf());
        let doc = loader.load("v1", "domain").unwrap();
        assert_eq!(doc["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_directory_loader_invalid_json() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("v1")).unwrap();
        std::fs::write(tmp.path().join("v1/domain.json"), "not json").unwrap();

        let err = SchemaLoader::Directory(tmp.path().to_path_buf())
            .load("v1", "domain")
            .unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_directory_loader_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SchemaLoader::Directory(tmp.path().to_path_buf())
            .load("v1", "domain")
            .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }
}
