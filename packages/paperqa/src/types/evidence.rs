//! Evidence chunks and query results.
//!
//! Evidence is assembled transiently per query from cached artifacts and
//! never persisted; only its embeddings are worth reusing, keyed by
//! content hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What kind of artifact an evidence chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Text,
    Table,
    Figure,
}

impl EvidenceKind {
    /// Label used when composing the grounding prompt.
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceKind::Text => "passage",
            EvidenceKind::Table => "table",
            EvidenceKind::Figure => "figure",
        }
    }
}

/// A retrievable unit of content with its embedding.
#[derive(Debug, Clone)]
pub struct EvidenceChunk {
    /// Source document id.
    pub document_id: String,

    /// Artifact kind.
    pub kind: EvidenceKind,

    /// Raw content: a text passage, a table rendered as CSV, or a figure
    /// caption plus description.
    pub content: String,

    /// Embedding vector; empty until embedded.
    pub embedding: Vec<f32>,
}

impl EvidenceChunk {
    /// Create an un-embedded chunk.
    pub fn new(
        document_id: impl Into<String>,
        kind: EvidenceKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            kind,
            content: content.into(),
            embedding: Vec::new(),
        }
    }

    /// Content hash used to reuse embeddings across queries.
    ///
    /// Identical content from different documents shares one key: the
    /// embedding depends only on the text.
    pub fn content_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// The grounded answer for one (question, document set) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResult {
    /// Human-readable synthesis of what was retrieved.
    pub summary: String,

    /// The grounded answer.
    pub answer: String,
}

impl QueryResult {
    /// The fixed result returned when no evidence was available.
    pub fn no_evidence() -> Self {
        Self {
            summary: "No evidence was retrieved from the selected papers.".to_string(),
            answer: "I cannot find an answer to this question in the selected papers."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_ignores_source_document() {
        let a = EvidenceChunk::new("doc-a", EvidenceKind::Text, "same passage");
        let b = EvidenceChunk::new("doc-b", EvidenceKind::Text, "same passage");
        assert_eq!(a.content_key(), b.content_key());

        let c = EvidenceChunk::new("doc-a", EvidenceKind::Text, "different passage");
        assert_ne!(a.content_key(), c.content_key());
    }
}
