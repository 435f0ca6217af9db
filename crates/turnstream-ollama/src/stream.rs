//! Turn-stream state machine: decoded records in, semantic steps out.
//!
//! Each record contributes events in the fixed order text → thinking →
//! tool calls, carrying only that record's delta. Records that contribute
//! nothing are consumed silently. When the record stream ends, exactly one
//! [`TurnStep::Done`] with the accumulated [`ChatResult`] is emitted and the
//! stream is exhausted.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::Value;
use turnstream::chat::{ChatEvent, ChatResult, ToolCall, TurnStep};
use turnstream::error::ChatError;
use turnstream::usage::TokenUsage;

use crate::types::StreamChunk;

type RecordStream = Pin<Box<dyn Stream<Item = Result<Value, ChatError>> + Send>>;

/// Adapts a record stream into a stream of [`TurnStep`]s.
pub(crate) struct TurnStream {
    records: RecordStream,
    queued: VecDeque<ChatEvent>,
    text: String,
    thinking: String,
    calls: Vec<ToolCall>,
    usage: Option<TokenUsage>,
    next_call_index: usize,
    finished: bool,
}

impl TurnStream {
    pub(crate) fn new(records: RecordStream) -> Self {
        Self {
            records,
            queued: VecDeque::new(),
            text: String::new(),
            thinking: String::new(),
            calls: Vec::new(),
            usage: None,
            next_call_index: 0,
            finished: false,
        }
    }

    /// Folds one record into the accumulators and queues its events.
    fn ingest(&mut self, record: Value) -> Result<(), ChatError> {
        let chunk: StreamChunk =
            serde_json::from_value(record.clone()).map_err(|err| ChatError::Decode {
                message: err.to_string(),
                line: record.to_string(),
            })?;

        if let Some(message) = chunk.error {
            return Err(ChatError::Backend { message });
        }

        if let Some(message) = chunk.message {
            if let Some(delta) = message.content
                && !delta.is_empty()
            {
                self.text.push_str(&delta);
                self.queued.push_back(ChatEvent::Text(delta));
            }
            if let Some(delta) = message.thinking
                && !delta.is_empty()
            {
                self.thinking.push_str(&delta);
                self.queued.push_back(ChatEvent::Thinking(delta));
            }
            if let Some(wire_calls) = message.tool_calls
                && !wire_calls.is_empty()
            {
                let mut new_calls = Vec::with_capacity(wire_calls.len());
                for wire in wire_calls {
                    // The wire carries no call ids; synthesize stable ones
                    // from the per-turn arrival index.
                    let id = format!("call_{}_{}", wire.function.name, self.next_call_index);
                    self.next_call_index += 1;
                    new_calls.push(ToolCall {
                        id,
                        name: wire.function.name,
                        arguments: wire.function.arguments,
                    });
                }
                self.calls.extend(new_calls.iter().cloned());
                self.queued.push_back(ChatEvent::ToolCalls(new_calls));
            }
        }

        if chunk.done {
            self.usage = Some(TokenUsage::from_counts(
                chunk.prompt_eval_count,
                chunk.eval_count,
            ));
        }
        Ok(())
    }

    fn finish(&mut self) -> ChatResult {
        self.finished = true;
        ChatResult {
            text: std::mem::take(&mut self.text),
            thinking: {
                let thinking = std::mem::take(&mut self.thinking);
                (!thinking.is_empty()).then_some(thinking)
            },
            tool_calls: std::mem::take(&mut self.calls),
            usage: self.usage.take().unwrap_or_default(),
        }
    }
}

impl Stream for TurnStream {
    type Item = Result<TurnStep, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(event) = this.queued.pop_front() {
                return Poll::Ready(Some(Ok(TurnStep::Event(event))));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match this.records.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(record))) => {
                    if let Err(err) = this.ingest(record) {
                        this.finished = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    let result = this.finish();
                    return Poll::Ready(Some(Ok(TurnStep::Done(result))));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
