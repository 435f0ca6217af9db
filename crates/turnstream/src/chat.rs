//! Conversation data model and streaming turn events.
//!
//! A turn streams zero or more [`ChatEvent`]s (incremental deltas) and ends
//! with exactly one [`ChatResult`] (the terminal aggregate). Both travel as
//! [`TurnStep`]s through an [`EventStream`].

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;
use crate::usage::TokenUsage;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions.
    System,
    /// Human input.
    User,
    /// Model output.
    Assistant,
    /// A tool result fed back to the model.
    Tool,
}

/// One entry in the conversation history.
///
/// History is append-only from the orchestration loop's perspective; the
/// engine reads it to build requests and returns new messages to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: ChatRole,
    /// Message text. May be empty for assistant messages that only carry
    /// tool calls.
    pub content: String,
    /// Tool invocations requested by an assistant message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// For `role: tool`, the id of the call this message answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates an assistant message carrying tool calls.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: (!calls.is_empty()).then_some(calls),
            tool_call_id: None,
        }
    }

    /// Creates a tool-result message answering `call_id`.
    pub fn tool(content: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A backend-requested invocation of a registered tool.
///
/// Immutable once received from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifies the call within its turn; pairs the call with its result.
    pub id: String,
    /// Registered tool name.
    pub name: String,
    /// Backend-supplied arguments, validated against the tool's schema
    /// before execution.
    pub arguments: Value,
}

/// An incremental, non-terminal signal emitted while a turn is in flight.
///
/// Deltas carry only what the producing record added, never the accumulated
/// buffers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatEvent {
    /// New response text.
    Text(String),
    /// New reasoning-trace text.
    Thinking(String),
    /// Tool calls newly reported by one record.
    ToolCalls(Vec<ToolCall>),
}

/// The terminal aggregate of one turn, produced exactly once when the
/// underlying stream ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatResult {
    /// Full accumulated response text.
    pub text: String,
    /// Full reasoning trace, absent when the backend emitted none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Every tool call reported during the turn, in arrival order. Empty
    /// when the turn ended in plain text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Token usage reported by the final record, zeroed when absent.
    pub usage: TokenUsage,
}

impl ChatResult {
    /// True when the backend requested tool execution.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One step of a streaming turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStep {
    /// An incremental event.
    Event(ChatEvent),
    /// The terminal result. Nothing follows it.
    Done(ChatResult),
}

/// A stream of turn steps, as produced by a backend.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<TurnStep, ChatError>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.content, "hello");
        assert!(msg.tool_calls.is_none());

        let msg = Message::tool("42", "call_add_0");
        assert_eq!(msg.role, ChatRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_add_0"));
    }

    #[test]
    fn test_assistant_with_empty_calls_stays_plain() {
        let msg = Message::assistant_with_calls("done", vec![]);
        assert!(msg.tool_calls.is_none());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = Message::system("be terse");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "system");
        assert!(value.get("tool_calls").is_none());
    }

    #[test]
    fn test_result_tool_calls_skipped_when_empty() {
        let result = ChatResult {
            text: "Hi".into(),
            ..Default::default()
        };
        assert!(!result.has_tool_calls());
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("tool_calls").is_none());
        assert!(value.get("thinking").is_none());
    }

    #[test]
    fn test_message_roundtrip_with_calls() {
        let msg = Message::assistant_with_calls(
            "",
            vec![ToolCall {
                id: "call_add_0".into(),
                name: "add".into(),
                arguments: json!({ "a": 1, "b": 2 }),
            }],
        );
        let round: Message = serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(round, msg);
    }
}
