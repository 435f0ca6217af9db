//! Streaming chat-turn engine.
//!
//! `turnstream` drives multi-round chat turns against a streaming backend:
//! it forwards incremental [`ChatEvent`]s as they arrive, executes
//! backend-requested tool calls concurrently through a [`ToolRegistry`],
//! feeds the results back, and repeats until the backend answers in plain
//! text. Background work (network reads, tool calls, status indicators)
//! runs inside a [`Scope`] that guarantees cancellation and cleanup.
//!
//! The wire protocol lives in a backend crate implementing [`ChatBackend`];
//! see `turnstream-ollama` for the NDJSON `/api/chat` backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use turnstream::{Message, ToolRegistry, TurnOptions, UsageState, run_turn};
//!
//! # async fn demo(backend: &dyn turnstream::ChatBackend) -> Result<(), turnstream::ChatError> {
//! let mut messages = vec![Message::user("What is 2 + 3?")];
//! let mut usage = UsageState::new(backend.context_limit());
//!
//! let outcome = run_turn(
//!     backend,
//!     &ToolRegistry::new(),
//!     &mut messages,
//!     &mut usage,
//!     &TurnOptions::default(),
//!     &CancellationToken::new(),
//!     |event| println!("{event:?}"),
//! )
//! .await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod chat;
pub mod engine;
pub mod error;
pub mod schema;
pub mod scope;
pub mod status;
pub mod structured;
pub mod tool;
pub mod usage;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use backend::{ChatBackend, TurnRequest};
pub use chat::{ChatEvent, ChatResult, ChatRole, EventStream, Message, ToolCall, TurnStep};
pub use engine::{TurnOptions, TurnOutcome, run_turn};
pub use error::ChatError;
pub use schema::{JsonSchema, SchemaViolation};
pub use scope::{Scope, ScopeError};
pub use status::{Spinner, StatusSink};
pub use structured::{ParseError, parse_structured, parse_structured_value};
pub use tool::{ToolDefinition, ToolError, ToolErrorPhase, ToolRegistry, ToolResult, tool_fn};
pub use usage::{TokenUsage, UsageState};
