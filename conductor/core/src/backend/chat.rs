//! OpenAI-compatible chat completions backend
//!
//! Works with any endpoint that speaks `POST {base_url}/chat/completions`
//! (Mistral, OpenAI, llama.cpp server, vLLM). The reply is read from
//! `choices[0].message.content`.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::traits::{LlmBackend, LlmRequest, LlmResponse, DEFAULT_REQUEST_TIMEOUT};

/// Default API root
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default model for the default API root
pub const DEFAULT_CHAT_MODEL: &str = "open-mistral-nemo";

/// Chat completions client
#[derive(Clone)]
pub struct ChatBackend {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl ChatBackend {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn request_body(request: &LlmRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
        });
        if request.max_tokens > 0 {
            body["max_tokens"] = serde_json::json!(request.max_tokens);
        }
        body
    }

    fn extract_content(data: &serde_json::Value) -> String {
        data.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string()
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

impl Default for ChatBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_BASE_URL, None, DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl LlmBackend for ChatBackend {
    fn name(&self) -> &'static str {
        "Chat"
    }

    async fn health_check(&self) -> bool {
        self.authorized(self.http_client.get(self.models_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();

        let response = self
            .authorized(self.http_client.post(self.completions_url()))
            .json(&Self::request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat endpoint returned {status}: {body}");
        }

        let data: serde_json::Value = response.json().await?;

        Ok(LlmResponse {
            content: Self::extract_content(&data),
            model: request.model.clone(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
        })
    }
}
