//! # Reference Store
//!
//! The fixed catalogue of schema documents that `$ref`s may point at,
//! keyed by absolute path (`/schemas/domain`, `/schemas/domains`, ...).
//!
//! The store is built once at startup and is read-only afterwards. It is
//! the only place references are resolved against: there is no retrieval
//! over the network and no relative-URI resolution.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::SchemaError;
use crate::loader::SchemaLoader;

/// Prefix shared by every catalogue key.
pub const SCHEMA_PATH_PREFIX: &str = "/schemas/";

/// The resource schemas known to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Domain,
    Domains,
    Record,
    Records,
    Server,
    Servers,
    TsigKey,
    TsigKeys,
}

impl ResourceKind {
    /// Every catalogue entry, singular before plural.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Domain,
        ResourceKind::Domains,
        ResourceKind::Record,
        ResourceKind::Records,
        ResourceKind::Server,
        ResourceKind::Servers,
        ResourceKind::TsigKey,
        ResourceKind::TsigKeys,
    ];

    /// Schema document name.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Domain => "domain",
            ResourceKind::Domains => "domains",
            ResourceKind::Record => "record",
            ResourceKind::Records => "records",
            ResourceKind::Server => "server",
            ResourceKind::Servers => "servers",
            ResourceKind::TsigKey => "tsigkey",
            ResourceKind::TsigKeys => "tsigkeys",
        }
    }

    /// Catalogue key, e.g. `/schemas/domain`.
    pub fn uri(self) -> String {
        format!("{SCHEMA_PATH_PREFIX}{}", self.name())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| SchemaError::UnknownResource(s.to_string()))
    }
}

/// Immutable map from catalogue key to parsed schema document.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    documents: HashMap<String, Value>,
}

impl ReferenceStore {
    /// Load every [`ResourceKind`] document for `version`.
    ///
    /// # Errors
    ///
    /// Returns the loader's error for the first document that fails.
    pub fn load(loader: &SchemaLoader, version: &str) -> Result<Self, SchemaError> {
        let mut documents = HashMap::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let doc = loader.load(version, kind.name())?;
            tracing::debug!(uri = %kind.uri(), version, "registered schema document");
            documents.insert(kind.uri(), doc);
        }
        Ok(Self { documents })
    }

    /// Build a store from explicit `(uri, document)` pairs.
    pub fn from_documents<K, I>(documents: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            documents: documents.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, uri: &str) -> Option<&Value> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Registered keys, sorted.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.documents.keys().map(|s| s.as_str()).collect();
        uris.sort_unstable();
        uris
    }

    /// `(uri, document)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> =
            self.documents.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_registers_singular_and_plural() {
        let store = ReferenceStore::load(&SchemaLoader::Embedded, "v1").unwrap();
        assert_eq!(store.len(), 8);
        assert_eq!(
            store.uris(),
            vec![
                "/schemas/domain",
                "/schemas/domains",
                "/schemas/record",
                "/schemas/records",
                "/schemas/server",
                "/schemas/servers",
                "/schemas/tsigkey",
                "/schemas/tsigkeys",
            ]
        );
    }

    #[test]
    fn test_resource_kind_round_trips_through_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.name().parse::<ResourceKind>().unwrap(), kind);
            assert_eq!(kind.uri(), format!("/schemas/{kind}"));
        }
    }

    #[test]
    fn test_unknown_resource_kind() {
        let err = "zone".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownResource(ref s) if s == "zone"));
    }

    #[test]
    fn test_from_documents() {
        let store = ReferenceStore::from_documents([("/schemas/x", json!({"type": "string"}))]);
        assert!(store.contains("/schemas/x"));
        assert!(!store.contains("/schemas/y"));
        assert_eq!(store.iter().count(), 1);
    }
}
