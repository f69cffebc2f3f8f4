//! # Error Types
//!
//! Two families of failure leave this crate:
//!
//! - [`ValidationError`] values describe a problem with the *data*. They are
//!   never raised on their own; [`SchemaDocument::validate`] collects every
//!   one of them and surfaces the full list through
//!   [`SchemaError::InvalidObject`].
//! - Every other [`SchemaError`] variant describes a problem with the
//!   *schemas* (an unresolvable `$ref`, an array shape the filter cannot
//!   project, a pattern that does not compile) or with loading them. These
//!   are authoring defects and are not recoverable at the call site.
//!
//! [`SchemaDocument::validate`]: crate::document::SchemaDocument::validate

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors returned by the schema layer.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `$ref` URI is not present in the reference store.
    #[error("Unresolvable JSON reference: {uri:?}")]
    UnresolvableReference {
        /// The URI part of the reference (everything before `#`).
        uri: String,
    },

    /// A JSON Pointer fragment walked off the resolved document.
    #[error("Unresolvable JSON pointer: {fragment:?}")]
    UnresolvablePointer {
        /// The fragment as written in the reference, leading `/` removed.
        fragment: String,
    },

    /// A chain of `$ref`s loops back on itself without consuming input.
    #[error("circular JSON reference: {reference:?}")]
    CircularReference {
        /// The reference that was seen twice.
        reference: String,
    },

    /// The object did not conform to the schema.
    #[error("Provided object does not match schema ({} error(s))", errors.len())]
    InvalidObject {
        /// Every violation found, in evaluation order.
        errors: Vec<ValidationError>,
    },

    /// The schema has a shape the filter does not support.
    #[error("unsupported schema shape: {0}")]
    UnsupportedSchema(String),

    /// A `pattern` or `patternProperties` key is not a valid regex.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A schema document could not be loaded.
    #[error("failed to load schema {name}: {reason}")]
    SchemaLoad {
        /// Schema name (`domain`, `records`, ...) or path.
        name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The requested resource kind is not part of the catalogue.
    #[error("unknown resource schema: {0}")]
    UnknownResource(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading schemas or configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// The validation errors carried by [`SchemaError::InvalidObject`], if any.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            SchemaError::InvalidObject { errors } => Some(errors),
            _ => None,
        }
    }
}

/// One step of an instance path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Root-first path from the validated object to the failing value.
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
    /// The schema keyword that failed (`format`, `required`, `oneOf`, ...).
    pub keyword: String,
}

impl ValidationError {
    /// Build an error at `path` for `keyword`.
    pub fn new(path: Vec<PathSegment>, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            keyword: keyword.into(),
        }
    }

    /// The path rendered dot-joined, root-first. Empty for the root.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path_string();
        if path.is_empty() {
            write!(f, "(root): {} [{}]", self.message, self.keyword)
        } else {
            write!(f, "{path}: {} [{}]", self.message, self.keyword)
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationError", 3)?;
        s.serialize_field("path", &self.path_string())?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("validator", &self.keyword)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_string_is_dot_joined_root_first() {
        let err = ValidationError::new(
            vec!["records".into(), 2.into(), "data".into()],
            "format",
            "x is not a host name",
        );
        assert_eq!(err.path_string(), "records.2.data");
    }

    #[test]
    fn test_display_root() {
        let err = ValidationError::new(vec![], "oneOf", "nope");
        assert_eq!(err.to_string(), "(root): nope [oneOf]");
    }

    #[test]
    fn test_serializes_with_validator_field() {
        let err = ValidationError::new(vec!["name".into()], "format", "bad");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"path": "name", "message": "bad", "validator": "format"})
        );
    }

    #[test]
    fn test_invalid_object_exposes_errors() {
        let err = SchemaError::InvalidObject {
            errors: vec![ValidationError::new(vec![], "type", "bad")],
        };
        assert_eq!(err.validation_errors().map(|e| e.len()), Some(1));
        assert!(err.to_string().contains("1 error(s)"));
        assert!(SchemaError::UnknownResource("x".into())
            .validation_errors()
            .is_none());
    }

    #[test]
    fn test_unresolvable_reference_names_uri() {
        let err = SchemaError::UnresolvableReference {
            uri: "/schemas/missing".into(),
        };
        assert!(err.to_string().contains("/schemas/missing"));
    }
}
