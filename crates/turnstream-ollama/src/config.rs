//! Client configuration.

use std::time::Duration;

/// Configuration for [`OllamaClient`](crate::OllamaClient).
///
/// Construct with struct update syntax:
///
/// ```rust
/// use turnstream_ollama::OllamaConfig;
///
/// let config = OllamaConfig {
///     model: "qwen3".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Model identifier, e.g. `"llama3.2"`.
    pub model: String,
    /// Base URL of the Ollama server. Defaults to `http://localhost:11434`.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves reqwest's default in place,
    /// which for a streaming response means no deadline.
    pub timeout: Option<Duration>,
    /// Shared HTTP client for connection pooling; a fresh one is built when
    /// absent.
    pub http_client: Option<reqwest::Client>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".into(),
            base_url: "http://localhost:11434".into(),
            timeout: None,
            http_client: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.base_url, "http://localhost:11434");
        assert!(config.timeout.is_none());
        assert!(config.http_client.is_none());
    }

    #[test]
    fn test_struct_update() {
        let config = OllamaConfig {
            base_url: "http://gpu-box:11434".into(),
            timeout: Some(Duration::from_secs(120)),
            ..Default::default()
        };
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
    }
}
