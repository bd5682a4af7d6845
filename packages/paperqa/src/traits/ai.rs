//! Model boundaries.
//!
//! The pipeline treats "call the chat model" and "call the embedding
//! model" as opaque synchronous services. Implementations wrap a specific
//! provider and own transport concerns (retry, backoff, credentials);
//! callers own prompt construction and response parsing.

use async_trait::async_trait;

use crate::error::AiResult;

/// Chat model boundary.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt, receive the raw completion text.
    async fn chat(&self, prompt: &str) -> AiResult<String>;

    /// Send a prompt alongside a raster image (JPEG bytes).
    ///
    /// Used for figure description; the image is the figure itself.
    async fn chat_with_image(&self, prompt: &str, image: &[u8]) -> AiResult<String>;
}

/// Embedding model boundary.
///
/// Deterministic per fixed model version. No retry or caching is required
/// inside implementations beyond transport-level retry; callers cache
/// externally when it pays off.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> AiResult<Vec<f32>>;

    /// Embed a batch; `result[i]` corresponds to `texts[i]`.
    async fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
            Ok(vec![text.len() as f32])
        }
    }

    #[test]
    fn test_default_embed_batch_preserves_order() {
        let embedder = LengthEmbedder;
        let batch = tokio_test::block_on(embedder.embed_batch(&["a", "abc", "ab"])).unwrap();
        assert_eq!(batch, vec![vec![1.0], vec![3.0], vec![2.0]]);
    }
}
