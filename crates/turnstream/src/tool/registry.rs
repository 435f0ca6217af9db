//! Tool registry and concurrent batch executor.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::chat::ToolCall;

use super::{ToolDefinition, ToolError, ToolHandler};

/// Successful outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// The id of the call this result answers.
    pub id: String,
    /// Result payload. Non-string handler return values are serialized to
    /// JSON text.
    pub content: String,
}

/// Maps tool names to handlers and executes calls against them.
///
/// Built once per session and read-only during a turn: `execute` takes
/// `&self`, so a running tool cannot register new tools or otherwise mutate
/// the registry.
///
/// Registering a second handler under an existing name replaces the first
/// (last registration wins) and logs a warning.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its definition's name.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.definition().name.clone();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(tool = %name, "replacing existing tool registration");
        }
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Definitions of every registered tool, sorted by name for a stable
    /// request body.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .handlers
            .values()
            .map(|h| h.definition().clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Executes one call: lookup, schema validation, then the handler.
    ///
    /// Resolves to exactly one of success or [`ToolError`]; an unknown name
    /// or invalid arguments never reach the handler.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let Some(handler) = self.handlers.get(&call.name) else {
            return Err(ToolError::not_found(call));
        };

        if let Err(violation) = handler.definition().parameters.validate(&call.arguments) {
            return Err(ToolError::validation(call, &violation));
        }

        debug!(tool = %call.name, call_id = %call.id, "executing tool");
        match handler.execute(call.arguments.clone()).await {
            Ok(value) => Ok(ToolResult {
                id: call.id.clone(),
                content: render_output(value),
            }),
            Err(source) => Err(ToolError::execution(call, source)),
        }
    }

    /// Executes a batch of calls concurrently.
    ///
    /// All calls are launched together and the batch completes only when
    /// every call has resolved; a slow or failing call does not hold back
    /// the others' execution. Results are returned in submission order
    /// regardless of completion order.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<Result<ToolResult, ToolError>> {
        join_all(calls.iter().map(|call| self.execute(call))).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

fn render_output(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
