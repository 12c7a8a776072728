//! AI text generation boundary.
//!
//! The engine treats generation as a black box with no retry logic of its
//! own; callers decide whether to retry at a higher level.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Generation API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Generation returned empty text")]
    Empty,
    #[error("Malformed generation response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce reply/post text for `source`. Fails on service errors or
    /// empty output, never silently degrades.
    async fn generate(
        &self,
        source: &str,
        context: Option<&str>,
    ) -> Result<String, GenerationError>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl HttpGenerator {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        system_prompt: &str,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(
        &self,
        source: &str,
        context: Option<&str>,
    ) -> Result<String, GenerationError> {
        let endpoint = format!("{}/chat/completions", self.base_url);

        let user_prompt = match context {
            Some(ctx) => format!("{source}\n\nContext: {ctx}"),
            None => source.to_string(),
        };
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": user_prompt },
            ],
        });

        let mut req = self.client.post(&endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        debug!(chars = text.len(), "Generated text");
        Ok(text.to_string())
    }
}
