//! Text Completion Backend Traits
//!
//! The conductor asks a backend for one short line of text per utterance.
//! Every provider sits behind [`LlmBackend`] so the reply path never knows
//! which transport answered.

use std::time::Duration;

use async_trait::async_trait;

/// Default request timeout for reply calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A single completion request
#[derive(Clone, Debug)]
pub struct LlmRequest {
    /// The prompt to send
    pub prompt: String,
    /// Model to use (backend-specific identifier)
    pub model: String,
    /// Maximum tokens in response (0 = backend default)
    pub max_tokens: u32,
    /// Sampling temperature (0.0-1.0)
    pub temperature: f32,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: String::new(),
            max_tokens: 0,
            temperature: 0.7,
        }
    }
}

impl LlmRequest {
    /// Create a new request with prompt and model
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Completed response
#[derive(Clone, Debug)]
pub struct LlmResponse {
    /// The response text, unprocessed
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Round-trip time in milliseconds
    pub duration_ms: Option<u64>,
}

/// Text completion backend
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name for logs (e.g., "Ollama")
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send a request and wait for the complete response
    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse>;
}

/// Backend connection configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local Ollama server
    Ollama {
        /// Ollama host address
        host: String,
        /// Ollama port number
        port: u16,
    },
    /// OpenAI-compatible `/chat/completions` endpoint
    Chat {
        /// API root, e.g. `https://api.mistral.ai/v1`
        base_url: String,
        /// Bearer token, if the endpoint needs one
        api_key: Option<String>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Ollama {
            host: "localhost".to_string(),
            port: 11434,
        }
    }
}

impl BackendConfig {
    /// Create Ollama configuration
    pub fn ollama(host: impl Into<String>, port: u16) -> Self {
        Self::Ollama {
            host: host.into(),
            port,
        }
    }

    /// Create chat-completions configuration
    pub fn chat(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::Chat {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Short name used in config files and env vars
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "ollama",
            Self::Chat { .. } => "chat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_builder() {
        let request = LlmRequest::new("Hello", "llama3.2")
            .with_temperature(0.5)
            .with_max_tokens(60);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.model, "llama3.2");
        assert!((request.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 60);
    }

    #[test]
    fn test_temperature_is_clamped() {
        let request = LlmRequest::new("x", "m").with_temperature(3.0);
        assert!((request.temperature - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_backend_config_default() {
        let config = BackendConfig::default();
        match config {
            BackendConfig::Ollama { ref host, port } => {
                assert_eq!(host, "localhost");
                assert_eq!(port, 11434);
            }
            BackendConfig::Chat { .. } => panic!("Expected Ollama config"),
        }
        assert_eq!(config.kind(), "ollama");
    }
}
