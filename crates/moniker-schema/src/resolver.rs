//! # Reference Resolution
//!
//! Resolves `$ref` strings against the static [`ReferenceStore`].
//!
//! A reference is split at its first `#` into a URI and a JSON Pointer
//! fragment. The URI is looked up verbatim: every reference in the
//! catalogue is absolute (`/schemas/domain#/properties/name`), so no base
//! URI is ever consulted. The fragment is percent-decoded, its leading `/`
//! removed, and each `/`-separated segment unescaped (`~1` then `~0`, the
//! RFC 6901 order) before walking the document.

use std::borrow::Cow;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::SchemaError;
use crate::store::ReferenceStore;

/// Resolves references against a shared, immutable store.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    store: Arc<ReferenceStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<ReferenceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Resolve `reference` to the schema node it names.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnresolvableReference`] if the URI is not in the store.
    /// - [`SchemaError::UnresolvablePointer`] if a fragment segment is missing.
    pub fn resolve(&self, reference: &str) -> Result<&Value, SchemaError> {
        let (uri, fragment) = split_reference(reference);

        let document = self.store.get(uri).ok_or_else(|| {
            tracing::debug!(reference, uri, "reference not in schema store");
            SchemaError::UnresolvableReference {
                uri: uri.to_string(),
            }
        })?;

        resolve_fragment(document, fragment.trim_start_matches('/'))
    }
}

/// Split at the first `#`. A reference without `#` has an empty fragment.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((uri, fragment)) => (uri, fragment),
        None => (reference, ""),
    }
}

/// Walk `fragment` (leading `/` already stripped) inside `document`.
///
/// An empty fragment names the whole document. Array nodes are addressed
/// by decimal index.
///
/// # Errors
///
/// Returns [`SchemaError::UnresolvablePointer`] naming the fragment if any
/// segment does not exist.
pub fn resolve_fragment<'a>(document: &'a Value, fragment: &str) -> Result<&'a Value, SchemaError> {
    if fragment.is_empty() {
        return Ok(document);
    }

    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    let mut node = document;

    for raw in decoded.split('/') {
        let segment = unescape_segment(raw);
        let next = match node {
            Value::Object(map) => map.get(segment.as_ref()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        node = next.ok_or_else(|| {
            tracing::debug!(fragment, segment = %segment, "JSON pointer segment not found");
            SchemaError::UnresolvablePointer {
                fragment: fragment.to_string(),
            }
        })?;
    }

    Ok(node)
}

fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}
