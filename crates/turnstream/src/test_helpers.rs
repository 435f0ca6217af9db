//! Turn-script builders for use with [`MockBackend`](crate::mock::MockBackend).

use crate::chat::{ChatEvent, ChatResult, ToolCall, TurnStep};
use crate::usage::TokenUsage;

/// A turn that streams `text` as one delta and completes with the given
/// usage.
pub fn text_turn(text: &str, usage: TokenUsage) -> Vec<TurnStep> {
    vec![
        TurnStep::Event(ChatEvent::Text(text.to_owned())),
        TurnStep::Done(ChatResult {
            text: text.to_owned(),
            thinking: None,
            tool_calls: Vec::new(),
            usage,
        }),
    ]
}

/// A turn that requests the given tool calls and no text.
pub fn tool_call_turn(calls: Vec<ToolCall>) -> Vec<TurnStep> {
    vec![
        TurnStep::Event(ChatEvent::ToolCalls(calls.clone())),
        TurnStep::Done(ChatResult {
            text: String::new(),
            thinking: None,
            tool_calls: calls,
            usage: TokenUsage::new(30, 12),
        }),
    ]
}

/// A turn with a visible reasoning trace before the answer.
pub fn thinking_turn(thinking: &str, text: &str, usage: TokenUsage) -> Vec<TurnStep> {
    vec![
        TurnStep::Event(ChatEvent::Thinking(thinking.to_owned())),
        TurnStep::Event(ChatEvent::Text(text.to_owned())),
        TurnStep::Done(ChatResult {
            text: text.to_owned(),
            thinking: Some(thinking.to_owned()),
            tool_calls: Vec::new(),
            usage,
        }),
    ]
}
