//! JSON Schema wrapper used for tool parameters and structured output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A value that failed schema validation.
///
/// Carries the schema and the offending value so callers can log or surface
/// a useful diagnostic.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SchemaViolation {
    /// Joined validator messages describing every violation found.
    pub message: String,
    /// The schema that was applied.
    pub schema: Value,
    /// The value that failed.
    pub actual: Value,
}

/// A JSON Schema document.
///
/// Wraps a raw `serde_json::Value` so schemas can be authored with
/// [`serde_json::json!`] and validated without the caller touching the
/// validator crate directly.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use turnstream::schema::JsonSchema;
///
/// let schema = JsonSchema::new(json!({
///     "type": "object",
///     "properties": { "city": { "type": "string" } },
///     "required": ["city"],
/// }));
/// assert!(schema.validate(&json!({ "city": "Lisbon" })).is_ok());
/// assert!(schema.validate(&json!({ "city": 7 })).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonSchema(Value);

impl JsonSchema {
    /// Wraps a raw schema value.
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// The schema accepting any object with no constraints.
    pub fn empty_object() -> Self {
        Self(serde_json::json!({ "type": "object" }))
    }

    /// The underlying schema document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Validates `value` against this schema.
    ///
    /// A schema that is itself malformed also reports as a violation, since
    /// the caller can do nothing different with the two cases.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let validator = jsonschema::validator_for(&self.0).map_err(|e| SchemaViolation {
            message: format!("invalid schema: {e}"),
            schema: self.0.clone(),
            actual: value.clone(),
        })?;

        let messages: Vec<String> = validator
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation {
                message: messages.join("; "),
                schema: self.0.clone(),
                actual: value.clone(),
            })
        }
    }
}

impl From<Value> for JsonSchema {
    fn from(schema: Value) -> Self {
        Self::new(schema)
    }
}
