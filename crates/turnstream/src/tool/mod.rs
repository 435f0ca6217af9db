//! Tool registration and concurrent execution.
//!
//! A [`ToolRegistry`] maps tool names to [`ToolHandler`]s. Execution of one
//! call goes lookup → schema validation → handler invocation, and resolves to
//! exactly one [`Result<ToolResult, ToolError>`]. Batches execute
//! concurrently with results returned in submission order.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use turnstream::schema::JsonSchema;
//! use turnstream::tool::{ToolRegistry, tool_fn};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(tool_fn(
//!     "add",
//!     "Adds two integers",
//!     JsonSchema::new(json!({
//!         "type": "object",
//!         "properties": { "a": { "type": "integer" }, "b": { "type": "integer" } },
//!         "required": ["a", "b"],
//!     })),
//!     |args| async move {
//!         let sum = args["a"].as_i64().unwrap_or(0) + args["b"].as_i64().unwrap_or(0);
//!         Ok(json!(sum))
//!     },
//! ));
//! ```

mod error;
mod handler;
mod registry;

pub use error::{ToolError, ToolErrorPhase};
pub use handler::{BoxError, HandlerFuture, ToolHandler, tool_fn};
pub use registry::{ToolRegistry, ToolResult};

use serde::{Deserialize, Serialize};

use crate::schema::JsonSchema;

/// Describes a tool to the backend.
///
/// `name` is the registry key; `parameters` is both the wire-advertised
/// schema and the validation gate applied to incoming arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: JsonSchema,
}

impl ToolDefinition {
    /// Creates a definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
