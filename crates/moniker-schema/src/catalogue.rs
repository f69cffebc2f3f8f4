//! # Schema Catalogue
//!
//! Process-wide wiring of the schema layer: one [`ReferenceStore`], one
//! shared [`ReferenceResolver`], and one [`SchemaDocument`] per
//! [`ResourceKind`]. Built once at startup, then shared (typically behind an
//! `Arc`) by every request handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::CatalogueConfig;
use crate::document::SchemaDocument;
use crate::error::SchemaError;
use crate::resolver::ReferenceResolver;
use crate::store::{ReferenceStore, ResourceKind};

/// Every resource schema of one API version.
#[derive(Debug)]
pub struct SchemaCatalogue {
    version: String,
    resolver: Arc<ReferenceResolver>,
    documents: BTreeMap<ResourceKind, SchemaDocument>,
}

impl SchemaCatalogue {
    /// Load and bind every resource schema named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if a document cannot be loaded and
    /// [`SchemaError::InvalidPattern`] if one carries an invalid pattern.
    pub fn new(config: &CatalogueConfig) -> Result<Self, SchemaError> {
        let loader = config.loader();
        let store = Arc::new(ReferenceStore::load(&loader, &config.api_version)?);
        let resolver = Arc::new(ReferenceResolver::new(store));

        let mut documents = BTreeMap::new();
        for kind in ResourceKind::ALL {
            let raw = resolver
                .store()
                .get(&kind.uri())
                .cloned()
                .ok_or_else(|| SchemaError::UnknownResource(kind.name().to_string()))?;
            documents.insert(kind, SchemaDocument::new(kind, raw, Arc::clone(&resolver))?);
        }

        tracing::debug!(
            version = %config.api_version,
            source = ?loader,
            documents = documents.len(),
            "schema catalogue ready"
        );

        Ok(Self {
            version: config.api_version.clone(),
            resolver,
            documents,
        })
    }

    /// The embedded v1 catalogue.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded documents are themselves broken.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::new(&CatalogueConfig::default())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The document for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownResource`] if the catalogue has no such
    /// document.
    pub fn document(&self, kind: ResourceKind) -> Result<&SchemaDocument, SchemaError> {
        self.documents
            .get(&kind)
            .ok_or_else(|| SchemaError::UnknownResource(kind.name().to_string()))
    }

    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.documents.values()
    }

    pub fn resolver(&self) -> &Arc<ReferenceResolver> {
        &self.resolver
    }

    pub fn store(&self) -> &ReferenceStore {
        self.resolver.store()
    }
}
