//! Parsing schema-constrained turn output.
//!
//! For turns sent with a `format` schema, the backend's aggregated text is
//! expected to be a JSON document matching that schema. Failures come back
//! as a typed [`ParseError`], never a panic, so the caller can retry,
//! degrade, or report.
//!
//! # Example
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_json::json;
//! use turnstream::schema::JsonSchema;
//! use turnstream::structured::parse_structured;
//!
//! #[derive(Deserialize)]
//! struct City { name: String, population: u64 }
//!
//! let schema = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "population": { "type": "integer" },
//!     },
//!     "required": ["name", "population"],
//! }));
//! let city: City = parse_structured(r#"{"name":"Porto","population":250000}"#, &schema).unwrap();
//! assert_eq!(city.name, "Porto");
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{JsonSchema, SchemaViolation};

/// Failure to interpret a structured turn's text.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The text was not valid JSON, or valid JSON that did not fit the
    /// target type.
    #[error("response is not valid JSON: {message}")]
    Json {
        /// Parser diagnostic.
        message: String,
        /// The full raw text, kept for retry prompts and logging.
        raw: String,
    },

    /// The JSON parsed but violated the expected schema.
    #[error("response failed schema validation: {violation}")]
    Validation {
        /// The violation, carrying schema and offending value.
        violation: SchemaViolation,
    },
}

/// Parses and validates `text` without binding it to a concrete type.
pub fn parse_structured_value(text: &str, schema: &JsonSchema) -> Result<Value, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::Json {
        message: e.to_string(),
        raw: text.to_owned(),
    })?;
    schema
        .validate(&value)
        .map_err(|violation| ParseError::Validation { violation })?;
    Ok(value)
}

/// Parses `text`, validates it against `schema`, and deserializes into `T`.
pub fn parse_structured<T: DeserializeOwned>(
    text: &str,
    schema: &JsonSchema,
) -> Result<T, ParseError> {
    let value = parse_structured_value(text, schema)?;
    serde_json::from_value(value).map_err(|e| ParseError::Json {
        message: e.to_string(),
        raw: text.to_owned(),
    })
}
