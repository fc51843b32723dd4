//! Minimal JSON Schema checking for tool arguments and payloads.
//!
//! Covers the subset the built-in tools declare: object shape, `required`
//! keys, primitive `type` tags, and `enum` membership. This is not a full
//! JSON Schema implementation and does not try to be; schemas here are
//! authored in-crate, so the subset is a closed world.

use serde_json::Value;

/// Check `value` against `schema`. Returns the first problem found.
pub(crate) fn validate(schema: &Value, value: &Value) -> Result<(), String> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        check_type(expected, value)?;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!("value {value} is not one of the allowed values"));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        let object = match value.as_object() {
            Some(object) => object,
            None => return Err("expected an object".to_string()),
        };

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(key) {
                    return Err(format!("missing required field '{key}'"));
                }
            }
        }

        for (key, field_schema) in properties {
            if let Some(field_value) = object.get(key) {
                validate(field_schema, field_value)
                    .map_err(|reason| format!("field '{key}': {reason}"))?;
            }
        }
    }

    Ok(())
}

fn check_type(expected: &str, value: &Value) -> Result<(), String> {
    let ok = match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        other => return Err(format!("unsupported schema type '{other}'")),
    };

    if ok {
        Ok(())
    } else {
        Err(format!("expected {expected}, got {}", type_name(value)))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
