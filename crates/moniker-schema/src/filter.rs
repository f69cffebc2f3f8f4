//! # Allowlist Filtering
//!
//! Projects an instance down to exactly the properties a schema declares.
//!
//! Every declared property appears in the output: present values are
//! copied (or projected further), absent ones become [`Instance::Null`].
//! Undeclared members are dropped at every depth. The input is never
//! modified.
//!
//! Each property schema is classified into a [`Projection`] before use:
//!
//! | Schema shape                               | Projection            |
//! |--------------------------------------------|-----------------------|
//! | `type: object` with `properties`           | `Object`              |
//! | `type: object`, no `properties`            | `Unsupported`         |
//! | `type: array`, `items` is one schema       | `ArrayOfItems`        |
//! | `type: array`, `items` is a list           | `Unsupported`         |
//! | `type: array`, no `items`, `properties`    | `ArrayOfProperties`   |
//! | `type: array`, neither                     | `Unsupported`         |
//! | anything else                              | `Scalar`              |

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::instance::Instance;
use crate::resolver::ReferenceResolver;

/// How a property schema is projected.
///
/// Shapes that would force nested members through unexamined are
/// `Unsupported`; the filter rejects them rather than copy them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection<'s> {
    /// Copied verbatim.
    Scalar,
    /// A nested object filtered against its own `properties`.
    Object(&'s Map<String, Value>),
    /// An array whose elements follow a single item schema.
    ArrayOfItems(&'s Value),
    /// An array whose elements are objects described by `properties`
    /// on the array schema itself.
    ArrayOfProperties(&'s Map<String, Value>),
    /// A shape the filter cannot project.
    Unsupported(&'static str),
}

impl<'s> Projection<'s> {
    /// Classify a property schema by its declared `type` and the presence
    /// of `items` / `properties`.
    pub fn classify(schema: &'s Value) -> Self {
        let properties = schema.get("properties").and_then(Value::as_object);
        match schema.get("type").and_then(Value::as_str) {
            Some("array") => match schema.get("items") {
                Some(Value::Array(_)) => Projection::Unsupported("tuple-typed array items"),
                Some(items @ Value::Object(_)) => Projection::ArrayOfItems(items),
                Some(_) => Projection::Unsupported("array items is not a schema"),
                None => match properties {
                    Some(props) => Projection::ArrayOfProperties(props),
                    None => Projection::Unsupported("array schema without items or properties"),
                },
            },
            Some("object") => match properties {
                Some(props) => Projection::Object(props),
                None => Projection::Unsupported("object schema without properties"),
            },
            _ => Projection::Scalar,
        }
    }
}

/// Filters instances against schemas, following `$ref` through a resolver.
#[derive(Debug, Clone, Copy)]
pub struct Filter<'r> {
    resolver: &'r ReferenceResolver,
}

impl<'r> Filter<'r> {
    pub fn new(resolver: &'r ReferenceResolver) -> Self {
        Self { resolver }
    }

    /// Build an object holding exactly the keys of `properties`.
    ///
    /// A non-object instance is treated as an object with no members.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSchema`] for object and array
    /// shapes that cannot be projected, and resolver errors for bad `$ref`s.
    pub fn object(&self, instance: &Instance, properties: &Map<String, Value>) -> Result<Instance, SchemaError> {
        let mut filtered = BTreeMap::new();

        for (name, subschema) in properties {
            let value = instance.get(name);
            let projected = match Projection::classify(subschema) {
                Projection::Scalar => value.cloned().unwrap_or_default(),
                Projection::Object(nested) => match value {
                    None | Some(Instance::Null) => Instance::Null,
                    Some(v) => self.object(v, nested)?,
                },
                _ => self.array(value, subschema)?,
            };
            filtered.insert(name.clone(), projected);
        }

        Ok(Instance::Object(filtered))
    }

    /// Project every element of an array property.
    ///
    /// A missing, `null` or non-array value projects to [`Instance::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSchema`] if `schema` is not an
    /// array shape the filter knows.
    pub fn array(&self, instance: Option<&Instance>, schema: &Value) -> Result<Instance, SchemaError> {
        let element_projection = match Projection::classify(schema) {
            Projection::ArrayOfItems(items) => {
                let items = self.follow_ref(items)?;
                match items.get("properties").and_then(Value::as_object) {
                    Some(props) => ElementProjection::Object(props),
                    None => ElementProjection::Item(items),
                }
            }
            Projection::ArrayOfProperties(props) => match props.get("$ref").and_then(Value::as_str) {
                Some(reference) => match self.resolver.resolve(reference)?.as_object() {
                    Some(resolved) => ElementProjection::Object(resolved),
                    None => {
                        return Err(SchemaError::UnsupportedSchema(format!(
                            "{reference} does not resolve to a property map"
                        )))
                    }
                },
                None => ElementProjection::Object(props),
            },
            Projection::Unsupported(reason) => return Err(SchemaError::UnsupportedSchema(reason.to_string())),
            Projection::Scalar | Projection::Object(_) => {
                return Err(SchemaError::UnsupportedSchema("not an array schema".to_string()))
            }
        };

        let Some(Instance::Array(elements)) = instance else {
            return Ok(Instance::Null);
        };

        let projected = elements
            .iter()
            .map(|element| match element_projection {
                ElementProjection::Object(props) => self.object(element, props),
                ElementProjection::Item(item) => self.element(element, item),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Instance::Array(projected))
    }

    /// Project one array element against an item schema without `properties`.
    fn element(&self, element: &Instance, item: &Value) -> Result<Instance, SchemaError> {
        match Projection::classify(item) {
            Projection::Scalar if !matches!(element, Instance::Object(_) | Instance::Array(_)) => {
                Ok(element.clone())
            }
            Projection::Scalar => Err(SchemaError::UnsupportedSchema(
                "array item schema declares no properties".to_string(),
            )),
            Projection::Object(props) => self.object(element, props),
            _ => self.array(Some(element), item),
        }
    }

    fn follow_ref<'s>(&self, schema: &'s Value) -> Result<&'s Value, SchemaError>
    where
        'r: 's,
    {
        match schema.get("$ref").and_then(Value::as_str) {
            Some(reference) => self.resolver.resolve(reference),
            None => Ok(schema),
        }
    }
}

#[derive(Clone, Copy)]
enum ElementProjection<'s> {
    Object(&'s Map<String, Value>),
    Item(&'s Value),
}
