//! # moniker-schema: Resource Schemas for the Moniker DNS API
//!
//! Validates inbound API objects and filters outbound ones against the
//! resource schemas (domains, records, servers, TSIG keys) of the Moniker
//! DNS-as-a-service API.
//!
//! ## Layers
//!
//! - [`store`]: the fixed catalogue of schema documents, keyed by
//!   `/schemas/<name>`, built once at startup.
//! - [`resolver`]: `$ref` resolution (URI lookup plus JSON Pointer walk)
//!   against that catalogue. Nothing is ever fetched over the network.
//! - [`engine`]: a Draft-3 validator with overrides for `type`, `format`,
//!   `anyOf`, `allOf` and `oneOf`. Objects built in-process may carry
//!   native timestamps ([`Instance::Timestamp`]) where the schema expects a
//!   `date-time` string.
//! - [`document`]: the [`SchemaDocument`] facade with `validate` and the
//!   allowlist `filter` ([`filter`]).
//! - [`catalogue`]: one document per resource kind, wired to a shared
//!   resolver.
//! - [`audit`]: authoring checks over the catalogue itself.
//!
//! ## Error Model
//!
//! Data problems are reported as a complete list of [`ValidationError`]s
//! inside [`SchemaError::InvalidObject`]. Schema problems (unresolvable
//! references, array shapes the filter cannot project) are separate
//! [`SchemaError`] variants, so callers can tell "your data is invalid"
//! from "the schema is malformed".
//!
//! ## Concurrency
//!
//! Everything is immutable after construction. [`SchemaCatalogue`] is
//! `Send + Sync` and is meant to be shared through an `Arc`; `validate`
//! and `filter` take `&self` and perform no I/O.

pub mod audit;
pub mod catalogue;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod instance;
pub mod loader;
pub mod resolver;
pub mod store;

pub use audit::{audit_catalogue, AuditFinding};
pub use catalogue::SchemaCatalogue;
pub use config::CatalogueConfig;
pub use document::SchemaDocument;
pub use engine::ValidationEngine;
pub use error::{PathSegment, SchemaError, ValidationError};
pub use filter::Projection;
pub use instance::Instance;
pub use loader::SchemaLoader;
pub use resolver::ReferenceResolver;
pub use store::{ReferenceStore, ResourceKind};
