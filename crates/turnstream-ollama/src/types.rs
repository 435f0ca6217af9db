//! Wire types for the `/api/chat` endpoint.
//!
//! Kept crate-private; the public surface speaks `turnstream`'s data model
//! and `convert`/`stream` translate at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    /// Included only when at least one tool is registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    /// Output schema for structured turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

/// A message as Ollama expects it.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Tool descriptor: `{"type": "function", "function": {...}}`.
#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool invocation, both in requests (assistant history) and in stream
/// records. Ollama sends no call ids; the stream layer synthesizes them.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireToolCall {
    pub function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// One decoded NDJSON record of a streaming response.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    /// Prompt token count; only meaningful when `done` is set.
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Completion token count; only meaningful when `done` is set.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// In-band failure; its presence aborts the turn.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_omits_absent_blocks() {
        let request = ChatRequest {
            model: "llama3.2".into(),
            messages: vec![WireMessage {
                role: "user".into(),
                content: "hi".into(),
                tool_calls: None,
            }],
            stream: true,
            tools: None,
            format: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("format").is_none());
        assert_eq!(value["stream"], true);
        assert!(value["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_descriptor_shape() {
        let tool = WireTool {
            tool_type: "function",
            function: WireFunction {
                name: "add".into(),
                description: "Adds".into(),
                parameters: json!({ "type": "object" }),
            },
        };
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "add");
    }

    #[test]
    fn test_chunk_with_thinking_and_counts() {
        let chunk: StreamChunk = serde_json::from_value(json!({
            "message": { "role": "assistant", "content": "", "thinking": "hmm" },
            "done": true,
            "prompt_eval_count": 5,
            "eval_count": 2,
        }))
        .unwrap();
        assert!(chunk.done);
        assert_eq!(chunk.message.unwrap().thinking.as_deref(), Some("hmm"));
        assert_eq!(chunk.prompt_eval_count, Some(5));
        assert_eq!(chunk.eval_count, Some(2));
    }

    #[test]
    fn test_chunk_defaults() {
        let chunk: StreamChunk = serde_json::from_value(json!({
            "message": { "role": "assistant", "content": "Hi" },
        }))
        .unwrap();
        assert!(!chunk.done);
        assert!(chunk.error.is_none());
    }

    #[test]
    fn test_stream_tool_call_without_arguments() {
        let call: WireToolCall = serde_json::from_value(json!({
            "function": { "name": "ping" },
        }))
        .unwrap();
        assert_eq!(call.function.name, "ping");
        assert!(call.function.arguments.is_null());
    }
}
