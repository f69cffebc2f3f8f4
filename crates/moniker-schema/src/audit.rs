//! # Catalogue Audit
//!
//! Authoring checks over the schema documents themselves, run by the CLI
//! `audit` command and by the test suite. A clean catalogue produces no
//! findings.
//!
//! Three checks are made per document:
//!
//! 1. **Shape**: the document satisfies an authoring meta-schema (an `id`
//!    under `/schemas/`, a `properties` object, well-formed `links`). The
//!    meta-schema is Draft 7 and is evaluated with the `jsonschema` crate.
//! 2. **Projectable shapes**: every `type: array` node has a shape the
//!    filter can project (single-schema `items`, or `properties`), and
//!    every `type: object` node declares `properties`.
//! 3. **References**: every `$ref` resolves through the store.
//!
//! Findings locate the problem with a JSON Pointer into the document.

use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

use crate::filter::Projection;
use crate::resolver::ReferenceResolver;
use crate::store::ReferenceStore;

static AUTHORING_META_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["id", "properties"],
        "properties": {
            "id": {"type": "string", "pattern": "^/schemas/[a-z]+$"},
            "title": {"type": "string"},
            "description": {"type": "string"},
            "properties": {
                "type": "object",
                "additionalProperties": {"type": "object"}
            },
            "links": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["rel", "href"],
                    "properties": {
                        "rel": {"type": "string"},
                        "href": {"type": "string"}
                    }
                }
            }
        }
    })
});

/// A single authoring problem in a catalogue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    /// Catalogue key of the document (`/schemas/domain`).
    pub document: String,
    /// JSON Pointer to the offending node; empty for the document root.
    pub json_path: String,
    pub message: String,
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.document, self.json_path, self.message)
    }
}

/// Audit every document in `store`.
pub fn audit_catalogue(store: &ReferenceStore) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    let meta = match opts.build(&AUTHORING_META_SCHEMA) {
        Ok(validator) => Some(validator),
        Err(e) => {
            findings.push(AuditFinding {
                document: String::new(),
                json_path: String::new(),
                message: format!("authoring meta-schema does not compile: {e}"),
            });
            None
        }
    };

    let resolver = ReferenceResolver::new(std::sync::Arc::new(store.clone()));

    for (uri, document) in store.iter() {
        if let Some(meta) = &meta {
            for error in meta.iter_errors(document) {
                findings.push(AuditFinding {
                    document: uri.to_string(),
                    json_path: error.instance_path.to_string(),
                    message: error.to_string(),
                });
            }
        }

        if let Some(id) = document.get("id").and_then(Value::as_str) {
            if id != uri {
                findings.push(AuditFinding {
                    document: uri.to_string(),
                    json_path: "/id".to_string(),
                    message: format!("id {id:?} does not match catalogue key"),
                });
            }
        }

        walk(uri, document, String::new(), &resolver, &mut findings);
    }

    tracing::debug!(
        documents = store.len(),
        findings = findings.len(),
        "catalogue audit complete"
    );
    findings
}

fn walk(uri: &str, node: &Value, pointer: String, resolver: &ReferenceResolver, findings: &mut Vec<AuditFinding>) {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if let Err(e) = resolver.resolve(reference) {
                    findings.push(AuditFinding {
                        document: uri.to_string(),
                        json_path: format!("{pointer}/$ref"),
                        message: e.to_string(),
                    });
                }
            }

            if let Projection::Unsupported(reason) = Projection::classify(node) {
                findings.push(AuditFinding {
                    document: uri.to_string(),
                    json_path: pointer.clone(),
                    message: format!("cannot be filtered: {reason}"),
                });
            }

            for (key, child) in map {
                walk(uri, child, format!("{pointer}/{}", escape(key)), resolver, findings);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(uri, child, format!("{pointer}/{i}"), resolver, findings);
            }
        }
        _ => {}
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
