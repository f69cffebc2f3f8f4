//! # Draft-3 Base Evaluator
//!
//! The keyword semantics of JSON Schema Draft 3 for every keyword the
//! engine does not override. Subschemas are evaluated back through the
//! [`ValidationEngine`] so overrides keep applying below this level.
//!
//! Annotation keywords (`id`, `title`, `description`, `default`, `readonly`,
//! `links`, `$schema`) and `format` produce no errors here.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Number, Value};

use super::{InstancePath, KeywordResult, ValidationEngine};
use crate::error::{SchemaError, ValidationError};
use crate::instance::Instance;

/// Draft-3 keyword evaluator with a table of precompiled patterns.
#[derive(Debug, Default)]
pub struct Draft3 {
    patterns: HashMap<String, Regex>,
}

impl Draft3 {
    /// Compile every `pattern` and `patternProperties` key found in `documents`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn compile<'a>(documents: impl IntoIterator<Item = &'a Value>) -> Result<Self, SchemaError> {
        let mut sources = Vec::new();
        for doc in documents {
            collect_patterns(doc, &mut sources);
        }

        let mut patterns = HashMap::with_capacity(sources.len());
        for source in sources {
            if patterns.contains_key(source) {
                continue;
            }
            let regex = compile_pattern(source)?;
            patterns.insert(source.to_string(), regex);
        }
        Ok(Self { patterns })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Evaluate a single keyword.
    pub fn evaluate(
        &self,
        engine: &ValidationEngine,
        keyword: &str,
        value: &Value,
        instance: &Instance,
        schema: &Map<String, Value>,
        path: &InstancePath,
    ) -> KeywordResult {
        match keyword {
            "type" => self.type_errors(engine, value, instance, path),
            "disallow" => disallow(engine, value, instance, path),
            "extends" => extends(engine, value, instance, path),
            "properties" => properties(engine, value, instance, path),
            "patternProperties" => self.pattern_properties(engine, value, instance, path),
            "additionalProperties" => self.additional_properties(engine, value, instance, schema, path),
            "items" => items(engine, value, instance, path),
            "additionalItems" => additional_items(engine, value, instance, schema, path),
            "dependencies" => dependencies(engine, value, instance, path),
            "minimum" => Ok(minimum(value, instance, schema, path)),
            "maximum" => Ok(maximum(value, instance, schema, path)),
            "divisibleBy" => Ok(divisible_by(value, instance, path)),
            "minLength" => Ok(min_length(value, instance, path)),
            "maxLength" => Ok(max_length(value, instance, path)),
            "pattern" => self.pattern(value, instance, path),
            "minItems" => Ok(min_items(value, instance, path)),
            "maxItems" => Ok(max_items(value, instance, path)),
            "uniqueItems" => Ok(unique_items(value, instance, path)),
            "enum" => Ok(enumeration(value, instance, path)),
            _ => Ok(Vec::new()),
        }
    }

    /// `type`: a type name, a schema, or a list of either. Passes if any
    /// member matches.
    pub fn type_errors(
        &self,
        engine: &ValidationEngine,
        types: &Value,
        instance: &Instance,
        path: &InstancePath,
    ) -> KeywordResult {
        let candidates = as_list(types);
        for candidate in &candidates {
            match candidate {
                Value::String(name) => {
                    if engine.is_type(instance, name) {
                        return Ok(Vec::new());
                    }
                }
                Value::Object(_) => {
                    if engine.errors_for(instance, candidate, path)?.is_empty() {
                        return Ok(Vec::new());
                    }
                }
                _ => {}
            }
        }

        Ok(vec![path.error(
            "type",
            format!("{instance} is not of type {}", render_list(&candidates)),
        )])
    }

    fn regex(&self, source: &str) -> Result<std::borrow::Cow<'_, Regex>, SchemaError> {
        match self.patterns.get(source) {
            Some(re) => Ok(std::borrow::Cow::Borrowed(re)),
            None => compile_pattern(source).map(std::borrow::Cow::Owned),
        }
    }

    fn pattern(&self, pattern: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
        let (Some(source), Instance::String(s)) = (pattern.as_str(), instance) else {
            return Ok(Vec::new());
        };
        if self.regex(source)?.is_match(s) {
            Ok(Vec::new())
        } else {
            Ok(vec![path.error("pattern", format!("{instance} does not match {pattern}"))])
        }
    }

    fn pattern_properties(
        &self,
        engine: &ValidationEngine,
        patterns: &Value,
        instance: &Instance,
        path: &InstancePath,
    ) -> KeywordResult {
        let (Some(patterns), Instance::Object(members)) = (patterns.as_object(), instance) else {
            return Ok(Vec::new());
        };

        let mut errors = Vec::new();
        for (source, subschema) in patterns {
            let re = self.regex(source)?;
            for (key, value) in members {
                if re.is_match(key) {
                    errors.extend(engine.errors_for(value, subschema, &path.child(key.as_str()))?);
                }
            }
        }
        Ok(errors)
    }

    fn additional_properties(
        &self,
        engine: &ValidationEngine,
        additional: &Value,
        instance: &Instance,
        schema: &Map<String, Value>,
        path: &InstancePath,
    ) -> KeywordResult {
        let Instance::Object(members) = instance else {
            return Ok(Vec::new());
        };

        let declared = schema.get("properties").and_then(Value::as_object);
        let mut pattern_res = Vec::new();
        if let Some(patterns) = schema.get("patternProperties").and_then(Value::as_object) {
            for source in patterns.keys() {
                pattern_res.push(self.regex(source)?);
            }
        }

        let extras: Vec<&String> = members
            .keys()
            .filter(|k| !declared.is_some_and(|d| d.contains_key(k.as_str())))
            .filter(|k| !pattern_res.iter().any(|re| re.is_match(k)))
            .collect();

        match additional {
            Value::Object(_) => {
                let mut errors = Vec::new();
                for key in extras {
                    if let Some(value) = members.get(key) {
                        errors.extend(engine.errors_for(value, additional, &path.child(key.as_str()))?);
                    }
                }
                Ok(errors)
            }
            Value::Bool(false) if !extras.is_empty() => {
                let verb = if extras.len() == 1 { "was" } else { "were" };
                let names = extras
                    .iter()
                    .map(|k| format!("{k:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(vec![path.error(
                    "additionalProperties",
                    format!("Additional properties are not allowed ({names} {verb} unexpected)"),
                )])
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn compile_pattern(source: &str) -> Result<Regex, SchemaError> {
    Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

fn collect_patterns<'a>(node: &'a Value, out: &mut Vec<&'a str>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("pattern", Value::String(source)) => out.push(source),
                    ("patternProperties", Value::Object(patterns)) => {
                        out.extend(patterns.keys().map(|k| k.as_str()));
                    }
                    _ => {}
                }
                collect_patterns(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_patterns(item, out);
            }
        }
        _ => {}
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn render_list(values: &[&Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn disallow(engine: &ValidationEngine, disallowed: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
    let mut errors = Vec::new();
    for candidate in as_list(disallowed) {
        let wrapped = serde_json::json!({ "type": [candidate] });
        if engine.is_valid_at(instance, &wrapped, path)? {
            errors.push(path.error("disallow", format!("{candidate} is disallowed for {instance}")));
        }
    }
    Ok(errors)
}

fn extends(engine: &ValidationEngine, extended: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
    let mut errors = Vec::new();
    for parent in as_list(extended) {
        errors.extend(engine.errors_for(instance, parent, path)?);
    }
    Ok(errors)
}

/// `properties` with Draft-3 property-level `required`.
fn properties(engine: &ValidationEngine, declared: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
    let (Some(declared), Instance::Object(members)) = (declared.as_object(), instance) else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::new();
    for (name, subschema) in declared {
        let child = path.child(name.as_str());
        match members.get(name) {
            Some(value) => errors.extend(engine.errors_for(value, subschema, &child)?),
            None => {
                if subschema.get("required").and_then(Value::as_bool) == Some(true) {
                    errors.push(child.error("required", format!("{name:?} is a required property")));
                }
            }
        }
    }
    Ok(errors)
}

fn items(engine: &ValidationEngine, items: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
    let Instance::Array(elements) = instance else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::new();
    match items {
        Value::Array(tuple) => {
            for (index, (element, subschema)) in elements.iter().zip(tuple).enumerate() {
                errors.extend(engine.errors_for(element, subschema, &path.child(index))?);
            }
        }
        Value::Object(_) => {
            for (index, element) in elements.iter().enumerate() {
                errors.extend(engine.errors_for(element, items, &path.child(index))?);
            }
        }
        _ => {}
    }
    Ok(errors)
}

fn additional_items(
    engine: &ValidationEngine,
    additional: &Value,
    instance: &Instance,
    schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    let (Instance::Array(elements), Some(Value::Array(tuple))) = (instance, schema.get("items")) else {
        return Ok(Vec::new());
    };
    if elements.len() <= tuple.len() {
        return Ok(Vec::new());
    }

    match additional {
        Value::Object(_) => {
            let mut errors = Vec::new();
            for (index, element) in elements.iter().enumerate().skip(tuple.len()) {
                errors.extend(engine.errors_for(element, additional, &path.child(index))?);
            }
            Ok(errors)
        }
        Value::Bool(false) => {
            let extra = elements.len() - tuple.len();
            let verb = if extra == 1 { "was" } else { "were" };
            Ok(vec![path.error(
                "additionalItems",
                format!("Additional items are not allowed ({extra} {verb} unexpected)"),
            )])
        }
        _ => Ok(Vec::new()),
    }
}

fn dependencies(engine: &ValidationEngine, dependencies: &Value, instance: &Instance, path: &InstancePath) -> KeywordResult {
    let (Some(dependencies), Instance::Object(members)) = (dependencies.as_object(), instance) else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::new();
    for (property, dependency) in dependencies {
        if !members.contains_key(property) {
            continue;
        }
        if dependency.is_object() {
            errors.extend(engine.errors_for(instance, dependency, path)?);
            continue;
        }
        for required in as_list(dependency) {
            if let Some(name) = required.as_str() {
                if !members.contains_key(name) {
                    errors.push(path.error(
                        "dependencies",
                        format!("{name:?} is a dependency of {property:?}"),
                    ));
                }
            }
        }
    }
    Ok(errors)
}

fn number_of(instance: &Instance) -> Option<f64> {
    match instance {
        Instance::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn minimum(limit: &Value, instance: &Instance, schema: &Map<String, Value>, path: &InstancePath) -> Vec<ValidationError> {
    let (Some(limit), Some(n)) = (limit.as_f64(), number_of(instance)) else {
        return Vec::new();
    };
    let exclusive = schema.get("exclusiveMinimum").and_then(Value::as_bool) == Some(true);
    let (failed, cmp) = if exclusive {
        (n <= limit, "less than or equal to")
    } else {
        (n < limit, "less than")
    };
    if failed {
        vec![path.error("minimum", format!("{instance} is {cmp} the minimum of {}", render_number(limit)))]
    } else {
        Vec::new()
    }
}

fn maximum(limit: &Value, instance: &Instance, schema: &Map<String, Value>, path: &InstancePath) -> Vec<ValidationError> {
    let (Some(limit), Some(n)) = (limit.as_f64(), number_of(instance)) else {
        return Vec::new();
    };
    let exclusive = schema.get("exclusiveMaximum").and_then(Value::as_bool) == Some(true);
    let (failed, cmp) = if exclusive {
        (n >= limit, "greater than or equal to")
    } else {
        (n > limit, "greater than")
    };
    if failed {
        vec![path.error("maximum", format!("{instance} is {cmp} the maximum of {}", render_number(limit)))]
    } else {
        Vec::new()
    }
}

fn render_number(n: f64) -> String {
    Number::from_f64(n)
        .map(|num| {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", n as i64)
            } else {
                num.to_string()
            }
        })
        .unwrap_or_else(|| n.to_string())
}

fn divisible_by(divisor: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    let Instance::Number(n) = instance else {
        return Vec::new();
    };
    let Some(d) = divisor.as_number() else {
        return Vec::new();
    };

    let failed = match (n.as_i64(), d.as_i64()) {
        (Some(_), Some(0)) => false,
        (Some(x), Some(y)) => x % y != 0,
        _ => match (n.as_f64(), d.as_f64()) {
            (Some(x), Some(y)) if y != 0.0 => (x / y).fract() != 0.0,
            _ => false,
        },
    };

    if failed {
        vec![path.error("divisibleBy", format!("{instance} is not a multiple of {divisor}"))]
    } else {
        Vec::new()
    }
}

fn min_length(limit: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    match (limit.as_u64(), instance) {
        (Some(limit), Instance::String(s)) if (s.chars().count() as u64) < limit => {
            vec![path.error("minLength", format!("{instance} is too short"))]
        }
        _ => Vec::new(),
    }
}

fn max_length(limit: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    match (limit.as_u64(), instance) {
        (Some(limit), Instance::String(s)) if (s.chars().count() as u64) > limit => {
            vec![path.error("maxLength", format!("{instance} is too long"))]
        }
        _ => Vec::new(),
    }
}

fn min_items(limit: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    match (limit.as_u64(), instance) {
        (Some(limit), Instance::Array(a)) if (a.len() as u64) < limit => {
            vec![path.error("minItems", format!("{instance} is too short"))]
        }
        _ => Vec::new(),
    }
}

fn max_items(limit: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    match (limit.as_u64(), instance) {
        (Some(limit), Instance::Array(a)) if (a.len() as u64) > limit => {
            vec![path.error("maxItems", format!("{instance} is too long"))]
        }
        _ => Vec::new(),
    }
}

fn unique_items(unique: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    let (Some(true), Instance::Array(elements)) = (unique.as_bool(), instance) else {
        return Vec::new();
    };
    let duplicated = elements
        .iter()
        .enumerate()
        .any(|(i, a)| elements[i + 1..].iter().any(|b| a.same_as(b)));
    if duplicated {
        vec![path.error("uniqueItems", format!("{instance} has non-unique elements"))]
    } else {
        Vec::new()
    }
}

fn enumeration(allowed: &Value, instance: &Instance, path: &InstancePath) -> Vec<ValidationError> {
    let Some(members) = allowed.as_array() else {
        return Vec::new();
    };
    if members.iter().any(|m| instance.equals_json(m)) {
        Vec::new()
    } else {
        vec![path.error("enum", format!("{instance} is not one of {allowed}"))]
    }
}
