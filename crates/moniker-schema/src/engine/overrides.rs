//! # Keyword Overrides
//!
//! Handlers installed in the engine's keyword table in place of the base
//! Draft-3 behaviour:
//!
//! | Keyword  | Behaviour |
//! |----------|-----------|
//! | `type`   | A native timestamp satisfies a `date-time` formatted field. |
//! | `format` | The formats in [`format`](super::format); strings only. |
//! | `anyOf`  | One aggregate error when no subschema matches. |
//! | `allOf`  | One error per failing subschema. |
//! | `oneOf`  | One error for no match, one error for several matches. |

use serde_json::{Map, Value};

use super::format::check_format;
use super::{InstancePath, KeywordResult, ValidationEngine};
use crate::instance::Instance;

pub fn type_keyword(
    engine: &ValidationEngine,
    types: &Value,
    instance: &Instance,
    schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    // Objects built in-process carry real timestamps, not strings.
    if schema.get("format").and_then(Value::as_str) == Some("date-time")
        && matches!(instance, Instance::Timestamp(_))
    {
        return Ok(Vec::new());
    }

    engine.base().type_errors(engine, types, instance, path)
}

pub fn format_keyword(
    _engine: &ValidationEngine,
    format: &Value,
    instance: &Instance,
    _schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    let (Some(format), Instance::String(value)) = (format.as_str(), instance) else {
        return Ok(Vec::new());
    };

    Ok(check_format(format, value)
        .err()
        .map(|kind| path.error("format", format!("{value} is not a {kind}")))
        .into_iter()
        .collect())
}

pub fn any_of(
    engine: &ValidationEngine,
    schemas: &Value,
    instance: &Instance,
    _schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    let Some(candidates) = schemas.as_array() else {
        return Ok(Vec::new());
    };

    for candidate in candidates {
        if engine.is_valid_at(instance, candidate, path)? {
            return Ok(Vec::new());
        }
    }

    Ok(vec![path.error(
        "anyOf",
        format!("{instance} is not valid for any of listed schemas {schemas}"),
    )])
}

pub fn all_of(
    engine: &ValidationEngine,
    schemas: &Value,
    instance: &Instance,
    _schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    let Some(candidates) = schemas.as_array() else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::new();
    for candidate in candidates {
        if !engine.is_valid_at(instance, candidate, path)? {
            errors.push(path.error("allOf", format!("{instance} is not valid against {candidate}")));
        }
    }
    Ok(errors)
}

pub fn one_of(
    engine: &ValidationEngine,
    schemas: &Value,
    instance: &Instance,
    _schema: &Map<String, Value>,
    path: &InstancePath,
) -> KeywordResult {
    let Some(candidates) = schemas.as_array() else {
        return Ok(Vec::new());
    };

    let mut matches = 0usize;
    for candidate in candidates {
        if engine.is_valid_at(instance, candidate, path)? {
            matches += 1;
        }
    }

    let error = match matches {
        1 => return Ok(Vec::new()),
        0 => path.error(
            "oneOf",
            format!("{instance} is not valid for any of listed schemas {schemas}"),
        ),
        _ => path.error(
            "oneOf",
            format!("{instance} matches more than one schema in {schemas}"),
        ),
    };
    Ok(vec![error])
}

#[cfg(test)]
mod tests {
    use super::super::tests::engine_with;
    use super::*;
    use crate::error::ValidationError;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn errors(schema: Value, instance: Instance) -> Vec<ValidationError> {
        engine_with(schema, vec![]).iter_errors(&instance).unwrap()
    }

    #[test]
    fn test_timestamp_satisfies_date_time_string() {
        let ts = Instance::from(Utc.with_ymd_and_hms(2013, 1, 2, 3, 4, 5).unwrap());
        let schema = json!({"type": "string", "format": "date-time"});
        assert!(errors(schema, ts).is_empty());
    }

    #[test]
    fn test_timestamp_without_date_time_format_is_not_a_string() {
        let ts = Instance::from(Utc.with_ymd_and_hms(2013, 1, 2, 3, 4, 5).unwrap());
        let errs = errors(json!({"type": "string"}), ts);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].keyword, "type");
    }

    #[test]
    fn test_timestamp_rejected_by_pure_draft3() {
        let store = crate::store::ReferenceStore::default();
        let resolver = std::sync::Arc::new(crate::resolver::ReferenceResolver::new(std::sync::Arc::new(store)));
        let engine = ValidationEngine::draft3_only(json!({"type": "string", "format": "date-time"}), resolver).unwrap();
        let ts = Instance::from(Utc.with_ymd_and_hms(2013, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(engine.iter_errors(&ts).unwrap().len(), 1);
    }

    #[test]
    fn test_other_type_mismatches_delegate() {
        let errs = errors(json!({"type": "integer", "format": "date-time"}), Instance::from("x"));
        assert_eq!(errs.iter().filter(|e| e.keyword == "type").count(), 1);
    }

    #[test]
    fn test_format_message() {
        let errs = errors(json!({"format": "domain-name"}), Instance::from("example.com"));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message, "example.com is not a domain name");
        assert_eq!(errs[0].keyword, "format");
    }

    #[test]
    fn test_format_ignores_non_strings() {
        assert!(errors(json!({"format": "ip-address"}), Instance::from(12)).is_empty());
        assert!(errors(json!({"format": "date"}), Instance::Null).is_empty());
    }

    #[test]
    fn test_date_time_string_format() {
        assert!(errors(json!({"format": "date-time"}), Instance::from("2013-01-02T03:04:05Z")).is_empty());
        let errs = errors(json!({"format": "date-time"}), Instance::from("tuesday"));
        assert_eq!(errs[0].message, "tuesday is not a ISO 8601 date");
    }

    #[test]
    fn test_any_of_single_aggregate_error() {
        let schema = json!({"anyOf": [{"type": "integer"}, {"type": "boolean"}, {"format": "ip-address"}]});
        assert!(errors(schema.clone(), Instance::from(1)).is_empty());
        assert!(errors(schema.clone(), Instance::from("192.0.2.1")).is_empty());
        let errs = errors(schema, Instance::from("nope"));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].keyword, "anyOf");
        assert!(errs[0].message.contains("is not valid for any of listed schemas"));
        assert!(errs[0].message.contains(r#""ip-address""#));
    }

    #[test]
    fn test_all_of_one_error_per_failing_subschema() {
        let schema = json!({"allOf": [
            {"type": "string"},
            {"minLength": 10},
            {"format": "ipv6"},
            {"maxLength": 1}
        ]});
        let errs = errors(schema, Instance::from("abc"));
        assert_eq!(errs.len(), 3);
        assert!(errs.iter().all(|e| e.keyword == "allOf"));
        assert!(errs[0].message.contains("minLength"));
        assert!(errs[1].message.contains("ipv6"));
        assert!(errs[2].message.contains("maxLength"));
    }

    #[test]
    fn test_all_of_passes_when_every_subschema_passes() {
        let schema = json!({"allOf": [{"type": "string"}, {"minLength": 1}]});
        assert!(errors(schema, Instance::from("a")).is_empty());
    }

    #[test]
    fn test_one_of_exactly_one_match() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "string"}, {"type": "boolean"}]});
        assert!(errors(schema, Instance::from(5)).is_empty());
    }

    #[test]
    fn test_one_of_no_match() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "string"}, {"type": "boolean"}]});
        let errs = errors(schema, Instance::Null);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("is not valid for any of listed schemas"));
    }

    #[test]
    fn test_one_of_several_matches_reported_once() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}, {"minimum": 0}, {}]});
        let errs = errors(schema, Instance::from(5));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].keyword, "oneOf");
        assert!(errs[0].message.contains("matches more than one schema"));
    }

    #[test]
    fn test_one_of_two_matches() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}, {"type": "string"}]});
        assert_eq!(errors(schema, Instance::from(5)).len(), 1);
    }

    #[test]
    fn test_combinators_apply_overrides_in_subschemas() {
        let schema = json!({"oneOf": [{"format": "host-name"}, {"format": "ip-address"}]});
        assert!(errors(schema.clone(), Instance::from("*.example.com.")).is_empty());
        assert_eq!(errors(schema, Instance::from("example")).len(), 1);
    }

    #[test]
    fn test_combinator_error_at_nested_path() {
        let schema = json!({"properties": {"data": {"anyOf": [{"format": "ipv6"}]}}});
        let errs = errors(schema, Instance::from(json!({"data": "x"})));
        assert_eq!(errs[0].path_string(), "data");
    }
}
