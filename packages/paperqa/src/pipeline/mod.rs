//! The extraction and retrieval-QA pipeline.
//!
//! - Extraction populates the artifact cache once per document
//! - Retrieval narrows the evidence pool for a question
//! - Answering grounds one chat call in the selected evidence
//! - Summarize and evaluate are independent side operations

pub mod answer;
pub mod evaluate;
pub mod extract;
pub mod prompts;
pub mod qa;
pub mod retrieve;
pub mod summarize;
pub mod tables;

pub use answer::{answer_question, compose_evidence, parse_answer_response};
pub use evaluate::{parse_judge_response, Metric};
pub use extract::{
    extract_figures, extract_meta, extract_tables, parse_detect_response,
    parse_structure_response, strip_code_fences,
};
pub use prompts::{template, template_hash, TemplateKind};
pub use qa::{chunk_text, QaPipeline};
pub use retrieve::{cosine_similarity, kmeans_assign, project, select_evidence};
pub use summarize::{summarize_docs, DocSummaryInput};
pub use tables::{clean_cell, fold_header, fold_header_row, structure_grid, FoldedHeader};
