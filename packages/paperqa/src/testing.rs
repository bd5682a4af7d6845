//! Testing utilities including mock implementations.
//!
//! Useful for exercising the pipeline without real model or OCR calls.
//! The mocks return deterministic, configurable responses and record
//! their calls for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{AiResult, DocIntelError, DocIntelResult};
use crate::traits::{ChatModel, DocIntel, Embedder};
use crate::types::{Document, PageText, RawFigure};

/// Record of a call made to [`MockAi`].
#[derive(Debug, Clone)]
pub enum MockAiCall {
    Chat { prompt_len: usize },
    ChatWithImage { prompt_len: usize },
    Embed { text_len: usize },
    EmbedBatch { count: usize },
}

/// A mock chat + embedding model.
///
/// Chat replies are picked by the first substring rule that matches the
/// prompt; unmatched prompts get the default reply. Embeddings are
/// predefined per exact text, falling back to a deterministic
/// hash-derived vector so identical content always embeds identically.
///
/// State is shared across clones, so a clone kept outside the pipeline
/// still observes every call.
#[derive(Clone)]
pub struct MockAi {
    rules: Arc<RwLock<Vec<(String, String)>>>,
    default_reply: Arc<RwLock<String>>,
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    embedding_dim: usize,
    calls: Arc<RwLock<Vec<MockAiCall>>>,
}

impl Default for MockAi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAi {
    /// Create a mock with no rules and a `"no"` default reply.
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(Vec::new())),
            default_reply: Arc::new(RwLock::new("no".to_string())),
            embeddings: Arc::new(RwLock::new(HashMap::new())),
            embedding_dim: 32,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Reply with `response` when the prompt contains `pattern`.
    ///
    /// Rules are checked in insertion order.
    pub fn with_reply(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((pattern.into(), response.into()));
        self
    }

    /// Set the reply for prompts no rule matches.
    pub fn with_default_reply(self, response: impl Into<String>) -> Self {
        *self.default_reply.write().unwrap() = response.into();
        self
    }

    /// Predefine the embedding for an exact text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockAiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of chat calls (with or without image).
    pub fn chat_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    MockAiCall::Chat { .. } | MockAiCall::ChatWithImage { .. }
                )
            })
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn reply_for(&self, prompt: &str) -> String {
        let rules = self.rules.read().unwrap();
        for (pattern, response) in rules.iter() {
            if prompt.contains(pattern.as_str()) {
                return response.clone();
            }
        }
        self.default_reply.read().unwrap().clone()
    }

    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        (0..self.embedding_dim)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                byte / 127.5 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl ChatModel for MockAi {
    async fn chat(&self, prompt: &str) -> AiResult<String> {
        self.calls.write().unwrap().push(MockAiCall::Chat {
            prompt_len: prompt.len(),
        });
        Ok(self.reply_for(prompt))
    }

    async fn chat_with_image(&self, prompt: &str, _image: &[u8]) -> AiResult<String> {
        self.calls.write().unwrap().push(MockAiCall::ChatWithImage {
            prompt_len: prompt.len(),
        });
        Ok(self.reply_for(prompt))
    }
}

#[async_trait]
impl Embedder for MockAi {
    async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        self.calls.write().unwrap().push(MockAiCall::Embed {
            text_len: text.len(),
        });
        if let Some(embedding) = self.embeddings.read().unwrap().get(text) {
            return Ok(embedding.clone());
        }
        Ok(self.deterministic_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        self.calls
            .write()
            .unwrap()
            .push(MockAiCall::EmbedBatch { count: texts.len() });
        let embeddings = self.embeddings.read().unwrap();
        Ok(texts
            .iter()
            .map(|text| {
                embeddings
                    .get(*text)
                    .cloned()
                    .unwrap_or_else(|| self.deterministic_embedding(text))
            })
            .collect())
    }
}

/// A mock document-intelligence boundary with preloaded content.
#[derive(Default)]
pub struct MockDocIntel {
    pages: RwLock<HashMap<String, Vec<PageText>>>,
    figures: RwLock<HashMap<String, Vec<RawFigure>>>,
}

impl MockDocIntel {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload page texts for a document id.
    pub fn with_pages(self, document_id: impl Into<String>, texts: &[&str]) -> Self {
        let pages = texts
            .iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page: i + 1,
                text: text.to_string(),
            })
            .collect();
        self.pages.write().unwrap().insert(document_id.into(), pages);
        self
    }

    /// Preload figures for a document id.
    pub fn with_figures(self, document_id: impl Into<String>, figures: Vec<RawFigure>) -> Self {
        self.figures
            .write()
            .unwrap()
            .insert(document_id.into(), figures);
        self
    }
}

#[async_trait]
impl DocIntel for MockDocIntel {
    async fn page_texts(&self, document: &Document) -> DocIntelResult<Vec<PageText>> {
        self.pages
            .read()
            .unwrap()
            .get(&document.id)
            .cloned()
            .ok_or_else(|| DocIntelError::DocumentNotFound(document.id.clone()))
    }

    async fn page_image(&self, document: &Document, _page: usize) -> DocIntelResult<Vec<u8>> {
        if self.pages.read().unwrap().contains_key(&document.id) {
            Ok(vec![0xFF, 0xD8, 0xFF]) // JPEG magic, enough for tests
        } else {
            Err(DocIntelError::DocumentNotFound(document.id.clone()))
        }
    }

    async fn figures(&self, document: &Document) -> DocIntelResult<Vec<RawFigure>> {
        Ok(self
            .figures
            .read()
            .unwrap()
            .get(&document.id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ai_rules_match_in_order() {
        let ai = MockAi::new()
            .with_reply("table", "[]")
            .with_reply("meta", "{}");

        assert_eq!(ai.chat("extract the table").await.unwrap(), "[]");
        assert_eq!(ai.chat("extract the meta").await.unwrap(), "{}");
        assert_eq!(ai.chat("something else").await.unwrap(), "no");
        assert_eq!(ai.chat_call_count(), 3);
    }

    #[tokio::test]
    async fn test_identical_text_embeds_identically() {
        let ai = MockAi::new();
        let a = ai.embed("same").await.unwrap();
        let b = ai.embed("same").await.unwrap();
        let c = ai.embed("different").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let ai = MockAi::new()
            .with_embedding("first", vec![1.0, 0.0])
            .with_embedding("second", vec![0.0, 1.0]);
        let batch = ai.embed_batch(&["first", "second"]).await.unwrap();
        assert_eq!(batch[0], vec![1.0, 0.0]);
        assert_eq!(batch[1], vec![0.0, 1.0]);
    }
}
