//! Grounded answering.
//!
//! One prompt, one chat call, one typed parse. The model is constrained
//! to the supplied evidence; when there is no evidence at all the fixed
//! "cannot find an answer" result is returned without a model call.

use serde::Deserialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::QueryError;
use crate::pipeline::extract::strip_code_fences;
use crate::pipeline::prompts::{format_answer, REPAIR_SUFFIX};
use crate::traits::ChatModel;
use crate::types::{EvidenceChunk, QueryResult};

/// Compose the evidence section of the grounding prompt.
///
/// Blocks are emitted in the retrieval order (similarity-descending) and
/// the total is bounded by `max_chars`: once the budget is spent,
/// remaining chunks are dropped rather than truncated mid-block.
pub fn compose_evidence(evidence: &[EvidenceChunk], max_chars: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in evidence.iter().enumerate() {
        let block = format!(
            "[{}] {} from paper \"{}\":\n{}\n\n",
            i + 1,
            chunk.kind.label(),
            chunk.document_id,
            chunk.content
        );
        if out.len() + block.len() > max_chars && !out.is_empty() {
            break;
        }
        out.push_str(&block);
    }
    out
}

#[derive(Deserialize)]
struct AnswerResponse {
    summary: String,
    answer: String,
}

/// Parse the model's `{"summary", "answer"}` reply.
pub fn parse_answer_response(raw: &str) -> Result<QueryResult, String> {
    let parsed: AnswerResponse = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok(QueryResult {
        summary: parsed.summary,
        answer: parsed.answer,
    })
}

/// Answer a question over the selected evidence.
///
/// No agentic retries: a single call, with one bounded re-prompt if the
/// output shape did not parse, then a typed failure, never a guessed
/// result.
pub async fn answer_question<C: ChatModel>(
    chat: &C,
    question: &str,
    evidence: &[EvidenceChunk],
    config: &PipelineConfig,
) -> Result<QueryResult, QueryError> {
    if evidence.is_empty() {
        return Ok(QueryResult::no_evidence());
    }

    let evidence_text = compose_evidence(evidence, config.max_prompt_chars);
    let prompt = format_answer(question, &evidence_text);

    let reply = chat.chat(&prompt).await?;
    match parse_answer_response(strip_code_fences(&reply)) {
        Ok(result) => Ok(result),
        Err(first_error) => {
            debug!(error = %first_error, "answer failed to parse, re-prompting once");
            let repair = format!("{prompt}{REPAIR_SUFFIX}");
            let reply = chat.chat(&repair).await?;
            parse_answer_response(strip_code_fences(&reply))
                .map_err(QueryError::MalformedAnswer)
        }
    }
}
