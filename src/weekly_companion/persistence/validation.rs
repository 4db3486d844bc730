//! Shape checks for imported payloads.
//!
//! Validation runs on the raw JSON value, before any typed decoding, and
//! collects every problem it finds instead of stopping at the first one so the
//! user sees the full list at once.

use crate::model::SCHEMA_VERSION;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

const COLLECTIONS: [&str; 3] = ["habits", "logs", "reflections"];

pub fn validate_import_payload(payload: &Value) -> ValidationResult {
    let Some(data) = payload.as_object() else {
        return ValidationResult::from_errors(vec!["Payload must be an object".to_string()]);
    };

    let mut errors = Vec::new();

    match data.get("schemaVersion").and_then(Value::as_f64) {
        None => errors.push("schemaVersion is missing or invalid".to_string()),
        Some(version) if version > f64::from(SCHEMA_VERSION) => {
            errors.push("schemaVersion is newer than supported".to_string())
        }
        Some(_) => {}
    }

    for name in COLLECTIONS {
        if !data.get(name).is_some_and(Value::is_array) {
            errors.push(format!("{} must be an array", name));
        }
    }

    ValidationResult::from_errors(errors)
}
