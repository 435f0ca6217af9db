//! HTTP client implementing [`ChatBackend`] against `/api/chat`.

use std::pin::Pin;

use serde::Deserialize;
use tracing::{debug, instrument};
use turnstream::backend::{ChatBackend, TurnRequest};
use turnstream::chat::EventStream;
use turnstream::error::ChatError;

use crate::config::OllamaConfig;
use crate::convert;
use crate::ndjson;
use crate::stream::TurnStream;
use crate::types::ChatRequest;

/// Streaming client for one Ollama server and model.
///
/// ```rust,no_run
/// use turnstream_ollama::{OllamaClient, OllamaConfig};
///
/// let client = OllamaClient::new(OllamaConfig {
///     model: "llama3.2".into(),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaClient {
    /// Creates a client, reusing the configured HTTP client when present.
    pub fn new(config: OllamaConfig) -> Self {
        let http = config.http_client.clone().unwrap_or_default();
        Self { config, http }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.base_url.trim_end_matches('/'))
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn send(&self, body: &ChatRequest) -> Result<reqwest::Response, ChatError> {
        let mut request = self.http.post(self.chat_url()).json(body);
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| ChatError::Http {
            status: err.status(),
            message: err.to_string(),
            retryable: err.is_connect() || err.is_timeout(),
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "chat stream opened");
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        // Ollama wraps failures as {"error": "..."} with a non-success
        // status; surface the server's own message when it does.
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(ChatError::Backend {
                message: parsed.error,
            });
        }
        Err(ChatError::Http {
            status: Some(status),
            message: if text.is_empty() {
                status.to_string()
            } else {
                text
            },
            retryable: status.is_server_error(),
        })
    }
}

impl ChatBackend for OllamaClient {
    fn stream_turn<'a>(
        &'a self,
        request: &'a TurnRequest,
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, ChatError>> + Send + 'a>> {
        Box::pin(async move {
            let body = convert::build_request(request, &self.config);
            let response = self.send(&body).await?;
            let records = ndjson::records(response.bytes_stream());
            Ok(Box::pin(TurnStream::new(Box::pin(records))) as EventStream)
        })
    }

    fn context_limit(&self) -> u64 {
        context_limit_for_model(&self.config.model)
    }
}

/// Context window by model family. Unknown models get the large default,
/// matching current llama-family releases.
fn context_limit_for_model(model: &str) -> u64 {
    let name = model.to_ascii_lowercase();
    if name.starts_with("mistral") {
        32_768
    } else if name.starts_with("gemma") {
        8_192
    } else {
        128_000
    }
}
