//! OpenAI implementation of the model boundaries.
//!
//! One client implements both [`ChatModel`] (chat completions, including
//! vision requests for figure description) and [`Embedder`] (the
//! embeddings endpoint, batch-capable). Transient failures - connection
//! errors, timeouts, 429s, 5xx - are retried with exponential backoff up
//! to a small bounded count, then surfaced as an exhaustion error.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::{AiError, AiResult};
use crate::traits::{ChatModel, Embedder};

/// OpenAI-backed chat and embedding client.
#[derive(Clone)]
pub struct OpenAi {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    max_retries: u32,
    retry_base: Duration,
}

impl OpenAi {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_retries: 2,
            retry_base: Duration::from_millis(500),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> AiResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiError::MissingCredentials("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the transient-failure retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// POST with bounded retry on transient failures.
    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> AiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let outcome = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await;

            let transient = match outcome {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response)
                    if response.status().as_u16() == 429
                        || response.status().is_server_error() =>
                {
                    format!("status {}", response.status())
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    return Err(AiError::Api { status, message });
                }
                Err(error) => error.to_string(),
            };

            if attempt > self.max_retries {
                return Err(AiError::Exhausted {
                    attempts: attempt,
                    last: transient,
                });
            }
            let backoff = self.retry_base * 2u32.pow(attempt - 1);
            warn!(%url, attempt, error = %transient, "transient provider failure, backing off");
            tokio::time::sleep(backoff).await;
        }
    }

    async fn chat_request(&self, messages: serde_json::Value) -> AiResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.0,
        });

        let response = self.post_json("/chat/completions", &body).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedOutput(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiError::MalformedOutput("no choices in chat response".into()))
    }
}

#[async_trait]
impl ChatModel for OpenAi {
    async fn chat(&self, prompt: &str) -> AiResult<String> {
        let messages = serde_json::json!([
            {"role": "user", "content": prompt},
        ]);
        self.chat_request(messages).await
    }

    async fn chat_with_image(&self, prompt: &str, image: &[u8]) -> AiResult<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let messages = serde_json::json!([
            {
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {
                        "type": "image_url",
                        "image_url": {"url": format!("data:image/jpeg;base64,{encoded}")}
                    }
                ]
            }
        ]);
        self.chat_request(messages).await
    }
}

#[async_trait]
impl Embedder for OpenAi {
    async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| AiError::MalformedOutput("no embedding in response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let response = self.post_json("/embeddings", &body).await?;
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedOutput(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(AiError::MalformedOutput(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API tags each vector with its input index; order the output
        // by it so result[i] always corresponds to texts[i].
        let mut data = parsed.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ai = OpenAi::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_embedding_model("text-embedding-3-large")
            .with_base_url("https://custom.api.com/v1")
            .with_max_retries(5);

        assert_eq!(ai.model, "gpt-4o-mini");
        assert_eq!(ai.embedding_model, "text-embedding-3-large");
        assert_eq!(ai.base_url, "https://custom.api.com/v1");
        assert_eq!(ai.max_retries, 5);
    }
}
