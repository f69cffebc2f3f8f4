//! # Schema Documents
//!
//! [`SchemaDocument`] binds one resource schema to a [`ValidationEngine`]
//! and the shared [`ReferenceResolver`]. It is the entry point API handlers
//! use for both directions of traffic:
//!
//! - inbound bodies are checked with [`SchemaDocument::validate`], which
//!   reports every violation at once;
//! - outbound objects are passed through [`SchemaDocument::filter`], which
//!   drops any field the schema does not declare.
//!
//! A document is immutable once built and may be shared across threads.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::engine::ValidationEngine;
use crate::error::SchemaError;
use crate::filter::Filter;
use crate::instance::Instance;
use crate::loader::SchemaLoader;
use crate::resolver::ReferenceResolver;
use crate::store::ResourceKind;

/// One resource schema, ready to validate and filter instances.
#[derive(Debug)]
pub struct SchemaDocument {
    kind: ResourceKind,
    engine: ValidationEngine,
    resolver: Arc<ReferenceResolver>,
    properties: Map<String, Value>,
}

impl SchemaDocument {
    /// Bind `raw` to a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] if a pattern in the schema or
    /// the store does not compile, or a resolver error if a top-level
    /// `$ref` does not resolve.
    pub fn new(kind: ResourceKind, raw: Value, resolver: Arc<ReferenceResolver>) -> Result<Self, SchemaError> {
        let properties = match raw.get("$ref").and_then(Value::as_str) {
            Some(reference) => resolver.resolve(reference)?.get("properties"),
            None => raw.get("properties"),
        }
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

        let engine = ValidationEngine::new(raw, Arc::clone(&resolver))?;

        Ok(Self {
            kind,
            engine,
            resolver,
            properties,
        })
    }

    /// Load the document for `kind` under `version` and bind it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the loader cannot produce the
    /// document, plus anything [`SchemaDocument::new`] returns.
    pub fn load(
        loader: &SchemaLoader,
        version: &str,
        kind: ResourceKind,
        resolver: Arc<ReferenceResolver>,
    ) -> Result<Self, SchemaError> {
        let raw = loader.load(version, kind.name())?;
        Self::new(kind, raw, resolver)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The schema exactly as loaded.
    pub fn raw(&self) -> &Value {
        self.engine.schema()
    }

    /// The root schema with a top-level `$ref` followed.
    ///
    /// # Errors
    ///
    /// Returns a resolver error if the top-level `$ref` does not resolve.
    pub fn schema(&self) -> Result<&Value, SchemaError> {
        match self.raw().get("$ref").and_then(Value::as_str) {
            Some(reference) => self.resolver.resolve(reference),
            None => Ok(self.raw()),
        }
    }

    /// Declared top-level properties. Empty if the schema declares none.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// The hyper-schema `links` array, untouched.
    pub fn links(&self) -> &[Value] {
        self.raw()
            .get("links")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn resolver(&self) -> &Arc<ReferenceResolver> {
        &self.resolver
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Check `instance` against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidObject`] carrying every violation if
    /// there is at least one. Schema defects met along the way (bad `$ref`,
    /// `$ref` cycle) are returned as their own variants.
    pub fn validate(&self, instance: &Instance) -> Result<(), SchemaError> {
        let errors = self.engine.iter_errors(instance)?;
        tracing::trace!(schema = self.kind.name(), errors = errors.len(), "validated instance");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::InvalidObject { errors })
        }
    }

    /// Project `instance` onto the schema's declared properties.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSchema`] if a declared array
    /// property has a shape the filter cannot project, or a resolver error
    /// for an unresolvable `$ref`.
    pub fn filter(&self, instance: &Instance) -> Result<Instance, SchemaError> {
        self.filter_with(instance, &self.properties)
    }

    /// Project `instance` onto an explicit property map.
    ///
    /// # Errors
    ///
    /// As [`SchemaDocument::filter`].
    pub fn filter_with(&self, instance: &Instance, properties: &Map<String, Value>) -> Result<Instance, SchemaError> {
        let filtered = Filter::new(&self.resolver).object(instance, properties)?;
        tracing::trace!(schema = self.kind.name(), properties = properties.len(), "filtered instance");
        Ok(filtered)
    }
}
