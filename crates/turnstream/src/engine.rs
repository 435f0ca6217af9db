//! The per-turn orchestration loop.
//!
//! [`run_turn`] drives one logical exchange: stream a turn from the backend,
//! forward incremental events to the caller, and while the backend keeps
//! requesting tools, execute them concurrently, feed the results back, and
//! stream again. The loop appends every message it produces to the
//! caller-owned history and records usage once per completed backend turn.
//!
//! Cancellation is checked at every suspension point and is not an error:
//! a cancelled turn reports [`TurnOutcome::Cancelled`] with no result.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::backend::{ChatBackend, TurnRequest};
use crate::chat::{ChatEvent, ChatResult, Message, TurnStep};
use crate::error::ChatError;
use crate::schema::JsonSchema;
use crate::tool::{ToolError, ToolRegistry, ToolResult};
use crate::usage::UsageState;

/// Knobs for one call to [`run_turn`].
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Output schema for structured turns; forwarded to the backend as the
    /// request `format`.
    pub format: Option<JsonSchema>,
    /// Upper bound on stream→tools→repeat cycles. When hit, the last
    /// [`ChatResult`] is returned as-is, tool calls and all; anything
    /// smarter is session policy and belongs to the caller.
    pub max_rounds: u32,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            format: None,
            max_rounds: 8,
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The backend produced a terminal result.
    Complete(ChatResult),
    /// The owning scope was cancelled mid-turn. History may contain
    /// messages from rounds that completed before the cancellation, but
    /// never an assistant tool-call message without its answering tool
    /// messages.
    Cancelled,
}

/// Runs one logical turn against `backend`.
///
/// `messages` is the caller-owned conversation history; the engine only
/// appends to it. `on_event` receives every incremental [`ChatEvent`] in
/// emission order. Tool failures are converted into synthetic tool messages
/// and never escalate; decode and backend failures abort the turn with an
/// error.
#[instrument(skip_all, fields(history = messages.len(), tools = tools.len()))]
pub async fn run_turn(
    backend: &dyn ChatBackend,
    tools: &ToolRegistry,
    messages: &mut Vec<Message>,
    usage: &mut UsageState,
    options: &TurnOptions,
    cancel: &CancellationToken,
    mut on_event: impl FnMut(ChatEvent) + Send,
) -> Result<TurnOutcome, ChatError> {
    let mut round = 0u32;
    loop {
        round += 1;
        let request = TurnRequest {
            messages: messages.clone(),
            tools: tools.definitions(),
            format: options.format.clone(),
        };

        let mut stream = tokio::select! {
            () = cancel.cancelled() => return Ok(TurnOutcome::Cancelled),
            started = backend.stream_turn(&request) => started?,
        };

        let result = loop {
            let step = tokio::select! {
                () = cancel.cancelled() => return Ok(TurnOutcome::Cancelled),
                step = stream.next() => step,
            };
            match step {
                Some(Ok(TurnStep::Event(event))) => on_event(event),
                Some(Ok(TurnStep::Done(result))) => break result,
                Some(Err(err)) => return Err(err),
                None => {
                    return Err(ChatError::Backend {
                        message: "stream ended without a terminal result".into(),
                    });
                }
            }
        };
        // Releases the connection before tool execution starts.
        drop(stream);

        usage.record(result.usage);
        debug!(
            round,
            tool_calls = result.tool_calls.len(),
            total_tokens = result.usage.total_tokens(),
            "turn round complete"
        );

        if !result.has_tool_calls() {
            messages.push(Message::assistant(result.text.clone()));
            return Ok(TurnOutcome::Complete(result));
        }

        // The assistant message is appended together with its answering
        // tool messages once the batch resolves, so a cancellation mid-batch
        // never leaves a tool-call message in the history with no results.
        let assistant = Message::assistant_with_calls(
            result.text.clone(),
            result.tool_calls.clone(),
        );
        let outcomes = tokio::select! {
            () = cancel.cancelled() => return Ok(TurnOutcome::Cancelled),
            outcomes = tools.execute_all(&result.tool_calls) => outcomes,
        };
        messages.push(assistant);
        for outcome in &outcomes {
            messages.push(tool_message(outcome));
        }

        if round >= options.max_rounds {
            debug!(round, "round limit reached, returning pending result");
            return Ok(TurnOutcome::Complete(result));
        }
    }
}

/// Converts a tool outcome into the message fed back to the backend.
///
/// Failures become text the model can react to on the next round.
fn tool_message(outcome: &Result<ToolResult, ToolError>) -> Message {
    match outcome {
        Ok(result) => Message::tool(result.content.clone(), result.id.clone()),
        Err(err) => Message::tool(format!("Error: {err}"), err.call_id.clone()),
    }
}
