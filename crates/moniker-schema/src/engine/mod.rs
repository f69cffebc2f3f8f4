//! # Validation Engine
//!
//! A Draft-3 validator with a small set of keyword overrides.
//!
//! The engine owns a keyword table mapping keyword names to handler
//! functions. The table is seeded with the overrides in [`overrides`]
//! (`type`, `format`, `anyOf`, `allOf`, `oneOf`); every keyword without an
//! entry is delegated to the embedded [`Draft3`] base evaluator. Subschemas
//! are always evaluated back through the engine, so overrides apply at every
//! depth (inside `properties`, `items`, combinators, and `$ref` targets).
//!
//! ## Error aggregation
//!
//! [`ValidationEngine::iter_errors`] runs every keyword of every reachable
//! subschema and returns all violations; nothing short-circuits on the
//! first error. Failures that are not about the data (an unresolvable
//! `$ref`, a `$ref` cycle, an invalid pattern) abort the pass with a
//! [`SchemaError`].

pub mod draft3;
pub mod format;
pub mod overrides;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{PathSegment, SchemaError, ValidationError};
use crate::instance::Instance;
use crate::resolver::ReferenceResolver;

pub use draft3::Draft3;

/// Outcome of evaluating one keyword (or one subschema).
pub type KeywordResult = Result<Vec<ValidationError>, SchemaError>;

/// Keyword handler: `(engine, keyword value, instance, enclosing schema, path)`.
pub type KeywordFn =
    fn(&ValidationEngine, &Value, &Instance, &Map<String, Value>, &InstancePath) -> KeywordResult;

/// Root-first location of the instance currently being validated.
///
/// Also records the `$ref`s already followed at this location on the
/// current evaluation stack. Following one of them again without moving
/// into the instance is a cycle.
#[derive(Debug, Clone, Default)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
    followed: Vec<String>,
}

impl InstancePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// The path one step further down.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            segments,
            followed: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// A [`ValidationError`] located here.
    pub fn error(&self, keyword: &str, message: impl Into<String>) -> ValidationError {
        ValidationError::new(self.segments.clone(), keyword, message)
    }

    fn following(&self, reference: &str) -> Result<Self, SchemaError> {
        if self.followed.iter().any(|seen| seen == reference) {
            return Err(SchemaError::CircularReference {
                reference: reference.to_string(),
            });
        }
        let mut next = self.clone();
        next.followed.push(reference.to_string());
        Ok(next)
    }
}

/// Validates instances against one root schema, resolving `$ref`s through
/// a shared [`ReferenceResolver`].
pub struct ValidationEngine {
    schema: Value,
    resolver: Arc<ReferenceResolver>,
    keywords: HashMap<&'static str, KeywordFn>,
    base: Draft3,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut overridden: Vec<&str> = self.keywords.keys().copied().collect();
        overridden.sort_unstable();
        f.debug_struct("ValidationEngine")
            .field("overridden_keywords", &overridden)
            .field("compiled_patterns", &self.base.pattern_count())
            .finish()
    }
}

impl ValidationEngine {
    /// Build an engine for `schema` with the standard overrides installed.
    ///
    /// Patterns in `schema` and in every document of the resolver's store
    /// are compiled up front.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] if any pattern fails to compile.
    pub fn new(schema: Value, resolver: Arc<ReferenceResolver>) -> Result<Self, SchemaError> {
        let base = Draft3::compile(
            std::iter::once(&schema).chain(resolver.store().iter().map(|(_, doc)| doc)),
        )?;

        let mut keywords: HashMap<&'static str, KeywordFn> = HashMap::new();
        keywords.insert("type", overrides::type_keyword);
        keywords.insert("format", overrides::format_keyword);
        keywords.insert("anyOf", overrides::any_of);
        keywords.insert("allOf", overrides::all_of);
        keywords.insert("oneOf", overrides::one_of);

        Ok(Self {
            schema,
            resolver,
            keywords,
            base,
        })
    }

    /// An engine with no overrides: pure Draft-3 behaviour.
    #[cfg(test)]
    pub(crate) fn draft3_only(schema: Value, resolver: Arc<ReferenceResolver>) -> Result<Self, SchemaError> {
        let mut engine = Self::new(schema, resolver)?;
        engine.keywords.clear();
        Ok(engine)
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    pub(crate) fn base(&self) -> &Draft3 {
        &self.base
    }

    /// Whether `keyword` is handled by the override table.
    pub fn overrides(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }

    /// Every violation of the root schema by `instance`.
    pub fn iter_errors(&self, instance: &Instance) -> KeywordResult {
        self.errors_for(instance, &self.schema, &InstancePath::root())
    }

    /// Whether `instance` satisfies `schema`.
    pub fn is_valid(&self, instance: &Instance, schema: &Value) -> Result<bool, SchemaError> {
        self.is_valid_at(instance, schema, &InstancePath::root())
    }

    /// [`is_valid`](Self::is_valid) for a subschema evaluated at `path`.
    pub fn is_valid_at(&self, instance: &Instance, schema: &Value, path: &InstancePath) -> Result<bool, SchemaError> {
        Ok(self.errors_for(instance, schema, path)?.is_empty())
    }

    /// Every violation of `schema` by the instance at `path`.
    ///
    /// A schema node carrying `$ref` is replaced by its target; sibling
    /// keywords are ignored (Draft-3). Non-object schemas accept anything.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::CircularReference`] when a `$ref` is reached
    /// again at the same instance location, whether directly or through
    /// combinators, `extends` or schema dependencies.
    pub fn errors_for(&self, instance: &Instance, schema: &Value, path: &InstancePath) -> KeywordResult {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            let path = path.following(reference)?;
            let target = self.resolver.resolve(reference)?;
            return self.errors_for(instance, target, &path);
        }

        let Some(schema) = schema.as_object() else {
            return Ok(Vec::new());
        };

        let mut errors = Vec::new();
        for (keyword, value) in schema {
            let found = match self.keywords.get(keyword.as_str()) {
                Some(handler) => handler(self, value, instance, schema, path)?,
                None => self.base.evaluate(self, keyword, value, instance, schema, path)?,
            };
            errors.extend(found);
        }
        Ok(errors)
    }

    /// Draft-3 type test. `any` matches everything; timestamps match no
    /// JSON type.
    pub fn is_type(&self, instance: &Instance, type_name: &str) -> bool {
        match type_name {
            "any" => true,
            "string" => matches!(instance, Instance::String(_)),
            "number" => matches!(instance, Instance::Number(_)),
            "integer" => match instance {
                Instance::Number(n) => n.is_i64() || n.is_u64(),
                _ => false,
            },
            "boolean" => matches!(instance, Instance::Bool(_)),
            "object" => matches!(instance, Instance::Object(_)),
            "array" => matches!(instance, Instance::Array(_)),
            "null" => matches!(instance, Instance::Null),
            _ => false,
        }
    }
}
