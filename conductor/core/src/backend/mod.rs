//! Text Completion Backends
//!
//! Reply generation goes through the [`LlmBackend`] trait.
//!
//! # Available Backends
//!
//! - **Ollama**: local server, `/api/generate` (default)
//! - **Chat**: any OpenAI-compatible `/chat/completions` endpoint
//!
//! # Usage
//!
//! ```ignore
//! use murmur_core::backend::{self, BackendConfig, LlmRequest};
//!
//! let backend = backend::from_config(&BackendConfig::default(), timeout);
//! let response = backend.send(&LlmRequest::new("Hello!", "llama3.2")).await?;
//! ```

mod chat;
mod ollama;
mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use chat::{ChatBackend, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL};
pub use ollama::OllamaBackend;
pub use traits::{BackendConfig, LlmBackend, LlmRequest, LlmResponse, DEFAULT_REQUEST_TIMEOUT};

/// Build the backend described by `config`
#[must_use]
pub fn from_config(config: &BackendConfig, timeout: Duration) -> Arc<dyn LlmBackend> {
    match config {
        BackendConfig::Ollama { host, port } => {
            Arc::new(OllamaBackend::new(host.clone(), *port, timeout))
        }
        BackendConfig::Chat { base_url, api_key } => {
            Arc::new(ChatBackend::new(base_url.clone(), api_key.clone(), timeout))
        }
    }
}
