//! Poetic replies
//!
//! Each utterance is sent to the backend wrapped in a prompt template. The
//! answer is cleaned of quotes and punctuation, lower-cased and trimmed.
//! Transport errors, HTTP errors and empty answers all collapse into "no
//! reply"; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{LlmBackend, LlmRequest, DEFAULT_REQUEST_TIMEOUT};

/// Placeholder replaced by the utterance in the prompt template
pub const UTTERANCE_PLACEHOLDER: &str = "{utterance}";

/// Default prompt template
pub const DEFAULT_PROMPT: &str =
    "Ответь одной поэтической строчкой. Поэзия на тему: \"{utterance}\"";

/// Default model for the Ollama backend
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Characters stripped from replies
const STRIPPED: &[char] = &[
    '«', '»', '\'', '"', '“', '”', '—', '.', '–', ':', ';', ',', '\n', '\r',
];

/// Reply request parameters
#[derive(Clone, Debug, PartialEq)]
pub struct ReplyConfig {
    /// Backend model identifier
    pub model: String,
    /// Prompt template containing `{utterance}`
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Token limit (0 = backend default)
    pub max_tokens: u32,
    /// HTTP timeout for one reply
    pub request_timeout: Duration,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ReplyConfig {
    /// Fill the prompt template
    #[must_use]
    pub fn render_prompt(&self, utterance: &str) -> String {
        self.prompt.replace(UTTERANCE_PLACEHOLDER, utterance)
    }
}

/// Remove quotes, dashes, punctuation and newlines; trim and lower-case
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn sanitize_reply(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !STRIPPED.contains(c)).collect();
    let cleaned = cleaned.trim().to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Turns utterances into poetic lines through a backend
pub struct ReplyComposer<B: LlmBackend + ?Sized> {
    backend: Arc<B>,
    config: ReplyConfig,
}

impl<B: LlmBackend + ?Sized> Clone for ReplyComposer<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B: LlmBackend + ?Sized> ReplyComposer<B> {
    /// Create a composer
    pub fn new(backend: Arc<B>, config: ReplyConfig) -> Self {
        Self { backend, config }
    }

    /// Request parameters
    pub fn config(&self) -> &ReplyConfig {
        &self.config
    }

    /// Build the backend request for an utterance
    pub fn request_for(&self, utterance: &str) -> LlmRequest {
        LlmRequest::new(self.config.render_prompt(utterance), &self.config.model)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }

    /// Probe the backend once; warns when it cannot be reached
    pub async fn check_backend(&self) -> bool {
        let healthy = self.backend.health_check().await;
        if healthy {
            tracing::debug!(backend = self.backend.name(), "Reply backend reachable");
        } else {
            tracing::warn!(
                backend = self.backend.name(),
                "Reply backend not reachable - replies will be skipped until it is"
            );
        }
        healthy
    }

    /// Ask for a reply; any failure is `None`
    pub async fn compose(&self, utterance: &str) -> Option<String> {
        let request = self.request_for(utterance);
        match self.backend.send(&request).await {
            Ok(response) => {
                let reply = sanitize_reply(&response.content);
                if reply.is_none() {
                    tracing::debug!(backend = self.backend.name(), "Backend returned an empty reply");
                }
                reply
            }
            Err(e) => {
                tracing::debug!(backend = self.backend.name(), error = %e, "Reply request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LlmResponse;
    use async_trait::async_trait;

    struct FixedBackend {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        fn name(&self) -> &str {
            "Fixed"
        }

        async fn health_check(&self) -> bool {
            self.reply.is_some()
        }

        async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
            match self.reply {
                Some(text) => Ok(LlmResponse {
                    content: text.to_string(),
                    model: request.model.clone(),
                    duration_ms: None,
                }),
                None => anyhow::bail!("connection refused"),
            }
        }
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_quotes() {
        assert_eq!(
            sanitize_reply("«Тихий снег, летит» — в ночи.\n"),
            Some("тихий снег летит  в ночи".to_string())
        );
        assert_eq!(
            sanitize_reply("\"Звёзды: “светят”; ‘ярко’ – всегда'\""),
            Some("звёзды светят ‘ярко’  всегда".to_string())
        );
    }

    #[test]
    fn test_sanitize_empty_is_none() {
        assert_eq!(sanitize_reply(""), None);
        assert_eq!(sanitize_reply(" «» ... \n"), None);
    }

    #[test]
    fn test_render_prompt() {
        let config = ReplyConfig::default();
        assert_eq!(
            config.render_prompt("привет мир"),
            "Ответь одной поэтической строчкой. Поэзия на тему: \"привет мир\""
        );
    }

    #[tokio::test]
    async fn test_check_backend_reports_reachability() {
        let up = ReplyComposer::new(Arc::new(FixedBackend { reply: Some("да") }), ReplyConfig::default());
        let down = ReplyComposer::new(Arc::new(FixedBackend { reply: None }), ReplyConfig::default());

        assert!(up.check_backend().await);
        assert!(!down.check_backend().await);
    }

    #[tokio::test]
    async fn test_compose_sanitizes_reply() {
        let composer = ReplyComposer::new(
            Arc::new(FixedBackend {
                reply: Some("«Тихий снег летит.»"),
            }),
            ReplyConfig::default(),
        );
        assert_eq!(
            composer.compose("привет мир").await,
            Some("тихий снег летит".to_string())
        );
    }

    #[tokio::test]
    async fn test_compose_failure_is_none() {
        let composer = ReplyComposer::new(Arc::new(FixedBackend { reply: None }), ReplyConfig::default());
        assert_eq!(composer.compose("привет").await, None);

        let composer = ReplyComposer::new(
            Arc::new(FixedBackend { reply: Some("...") }),
            ReplyConfig::default(),
        );
        assert_eq!(composer.compose("привет").await, None);
    }
}
