//! The seam between the orchestration engine and a concrete wire backend.

use std::future::Future;
use std::pin::Pin;

use crate::chat::{EventStream, Message};
use crate::error::ChatError;
use crate::schema::JsonSchema;
use crate::tool::ToolDefinition;

/// Everything a backend needs to stream one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// Conversation history, oldest first.
    pub messages: Vec<Message>,
    /// Advertised tools. Empty means the turn is tool-free and the backend
    /// must not include a tool block in its request.
    pub tools: Vec<ToolDefinition>,
    /// Output schema for structured turns.
    pub format: Option<JsonSchema>,
}

/// A streaming chat backend.
///
/// Object-safe: the engine holds `&dyn ChatBackend`, so implementations box
/// their futures. The returned stream must emit zero or more events followed
/// by exactly one [`TurnStep::Done`](crate::chat::TurnStep::Done).
///
/// Dropping the returned stream must release the underlying transport; the
/// engine relies on that for cancellation.
pub trait ChatBackend: Send + Sync {
    /// Starts one streaming turn.
    fn stream_turn<'a>(
        &'a self,
        request: &'a TurnRequest,
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, ChatError>> + Send + 'a>>;

    /// Context window of the configured model, in tokens.
    fn context_limit(&self) -> u64;
}

impl TurnRequest {
    /// A request with no tools and no output schema.
    pub fn plain(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            format: None,
        }
    }
}
