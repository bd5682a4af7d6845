//! LLM-graded answer evaluation.
//!
//! Runs independently of the answer path (observability and testing) and
//! never affects a returned result: a pure function of its inputs beyond
//! the outbound judge call.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{AiError, AiResult};
use crate::pipeline::extract::strip_code_fences;
use crate::pipeline::prompts::format_relevancy_judge;
use crate::traits::ChatModel;

/// Metrics the evaluator can grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Does the answer address what was asked?
    AnswerRelevancy,
}

impl Metric {
    /// Name used in the returned score map.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AnswerRelevancy => "answer_relevancy",
        }
    }
}

#[derive(Deserialize)]
struct JudgeResponse {
    score: f64,
}

/// Parse the judge's `{"score": ...}` reply, clamped to [0, 1].
pub fn parse_judge_response(raw: &str) -> Result<f64, String> {
    let parsed: JudgeResponse = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok(parsed.score.clamp(0.0, 1.0))
}

/// Grade an answer against the question with one judge call per metric.
///
/// `contexts` is accepted for future context-dependent metrics; the
/// relevancy judge does not use it.
pub async fn score<C: ChatModel>(
    chat: &C,
    question: &str,
    answer: &str,
    _contexts: &str,
    metrics: &[Metric],
) -> AiResult<HashMap<String, f64>> {
    let mut scores = HashMap::new();
    for metric in metrics {
        let prompt = match metric {
            Metric::AnswerRelevancy => format_relevancy_judge(question, answer),
        };
        let reply = chat.chat(&prompt).await?;
        let value = parse_judge_response(strip_code_fences(&reply))
            .map_err(AiError::MalformedOutput)?;
        debug!(metric = metric.name(), score = value, "graded answer");
        scores.insert(metric.name().to_string(), value);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judge_response() {
        assert_eq!(parse_judge_response(r#"{"score": 0.8}"#).unwrap(), 0.8);
        assert_eq!(parse_judge_response(r#"{"score": 1.7}"#).unwrap(), 1.0);
        assert_eq!(parse_judge_response(r#"{"score": -0.2}"#).unwrap(), 0.0);
        assert!(parse_judge_response("relevant").is_err());
    }
}
