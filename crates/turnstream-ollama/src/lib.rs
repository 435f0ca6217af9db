//! Ollama backend for `turnstream`.
//!
//! Implements [`turnstream::ChatBackend`] over Ollama's streaming
//! `POST /api/chat` endpoint: requests go out as a single JSON body, the
//! response comes back as chunked NDJSON and is decoded into `turnstream`'s
//! event model.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use turnstream::{ChatBackend, Message, ToolRegistry, TurnOptions, UsageState, run_turn};
//! use turnstream_ollama::{OllamaClient, OllamaConfig};
//!
//! # async fn demo() -> Result<(), turnstream::ChatError> {
//! let client = OllamaClient::new(OllamaConfig::default());
//! let mut messages = vec![Message::user("Why is the sky blue?")];
//! let mut usage = UsageState::new(client.context_limit());
//!
//! run_turn(
//!     &client,
//!     &ToolRegistry::new(),
//!     &mut messages,
//!     &mut usage,
//!     &TurnOptions::default(),
//!     &CancellationToken::new(),
//!     |event| println!("{event:?}"),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod convert;
pub mod ndjson;
mod stream;
mod types;

pub use client::OllamaClient;
pub use config::OllamaConfig;
