//! Per-call tool failure type.

use thiserror::Error;

use crate::chat::ToolCall;
use crate::schema::SchemaViolation;

use super::handler::BoxError;

/// Which stage of execution a tool call failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorPhase {
    /// No tool is registered under the requested name.
    NotFound,
    /// Arguments did not satisfy the tool's parameter schema; the handler
    /// was never invoked.
    Validation,
    /// The handler itself faulted.
    Execution,
}

impl std::fmt::Display for ToolErrorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Execution => "execution",
        };
        f.write_str(label)
    }
}

/// Failure of a single tool call.
///
/// Scoped to the call: it never aborts the turn. The orchestration loop
/// converts it into a synthetic tool message so the backend can react.
#[derive(Debug, Error)]
#[error("tool '{tool_name}' failed ({phase}): {message}")]
pub struct ToolError {
    /// The id of the call that failed.
    pub call_id: String,
    /// The requested tool name.
    pub tool_name: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// Stage the failure occurred in.
    pub phase: ToolErrorPhase,
    /// Original handler fault, kept for diagnostics.
    #[source]
    pub source: Option<BoxError>,
}

impl ToolError {
    /// The requested name is not registered.
    pub fn not_found(call: &ToolCall) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            message: format!("unknown tool '{}'", call.name),
            phase: ToolErrorPhase::NotFound,
            source: None,
        }
    }

    /// The arguments failed schema validation.
    pub fn validation(call: &ToolCall, violation: &SchemaViolation) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            message: violation.message.clone(),
            phase: ToolErrorPhase::Validation,
            source: None,
        }
    }

    /// The handler faulted.
    pub fn execution(call: &ToolCall, source: BoxError) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            message: source.to_string(),
            phase: ToolErrorPhase::Execution,
            source: Some(source),
        }
    }
}
