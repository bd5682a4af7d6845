//! Multi-paper summarization.
//!
//! A distinct, simpler operation than `ask`: composes titles and
//! abstracts of the selected papers into one synthesis with a single
//! chat call. No retrieval is involved.

use crate::error::AiResult;
use crate::pipeline::prompts::format_summarize;
use crate::traits::ChatModel;

/// A (title, abstract) pair as provided by the caller.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocSummaryInput {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// Render the document list for the summarize prompt.
pub fn compose_documents(docs: &[DocSummaryInput]) -> String {
    docs.iter()
        .map(|doc| {
            format!(
                "paper title: {}; paper abstract: {}",
                doc.title, doc.abstract_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Summarize a collection of papers from their titles and abstracts.
pub async fn summarize_docs<C: ChatModel>(
    chat: &C,
    docs: &[DocSummaryInput],
) -> AiResult<String> {
    if docs.is_empty() {
        return Ok(String::new());
    }
    let prompt = format_summarize(&compose_documents(docs));
    chat.chat(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_documents() {
        let docs = vec![
            DocSummaryInput {
                title: "A".into(),
                abstract_text: "first".into(),
            },
            DocSummaryInput {
                title: "B".into(),
                abstract_text: "second".into(),
            },
        ];
        let text = compose_documents(&docs);
        assert!(text.contains("paper title: A; paper abstract: first"));
        assert!(text.contains("paper title: B; paper abstract: second"));
    }
}
