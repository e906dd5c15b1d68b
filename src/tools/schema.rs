//! Optional argument check against a tool's declared `inputSchema`.
//!
//! Kept apart from normalization: defaults are inferred from names, and this
//! pass only reports whether the final arguments satisfy the schema.

use serde_json::Value;

use super::normalize::ArgumentMap;

/// Validate `args` against `schema`.
///
/// Returns a list of human-readable violations (empty = valid). A schema that
/// is not a JSON object places no constraints; a schema that fails to compile
/// yields a single entry describing why.
pub fn validate_arguments(schema: &Value, args: &ArgumentMap) -> Vec<String> {
    if !schema.is_object() {
        return Vec::new();
    }

    let validator = match jsonschema::validator_for(schema) {
        Ok(v) => v,
        Err(e) => return vec![format!("invalid input schema: {}", e)],
    };

    let instance = Value::Object(args.clone());
    validator
        .iter_errors(&instance)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "maxResults": {"type": "integer", "minimum": 1}
            },
            "required": ["query"]
        })
    }

    fn args(value: Value) -> ArgumentMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_valid_arguments() {
        let errors = validate_arguments(&schema(), &args(json!({"query": "rust", "maxResults": 5})));
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_missing_required() {
        let errors = validate_arguments(&schema(), &args(json!({"maxResults": 5})));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("query"));
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let errors = validate_arguments(&schema(), &args(json!({"query": "x", "maxResults": 0})));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/maxResults"), "got {:?}", errors);
    }

    #[test]
    fn test_non_object_schema_is_unconstrained() {
        assert!(validate_arguments(&Value::Null, &args(json!({"a": 1}))).is_empty());
    }

    #[test]
    fn test_broken_schema_is_reported() {
        let errors = validate_arguments(&json!({"type": 12}), &args(json!({})));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("invalid input schema"));
    }
}
