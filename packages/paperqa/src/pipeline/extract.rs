//! Per-document artifact extraction.
//!
//! Metadata, tables, and figures are extracted with prompt-templated chat
//! calls under strict output contracts. Table work is two-staged: a
//! per-page detection pass returns verbatim regions (provenance), and a
//! structuring pass turns each region into a clean CSV grid. Independent
//! items fan out concurrently, and a failed item is logged and skipped;
//! one bad page never aborts the rest of the document.

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::pipeline::prompts::{
    format_figure_describe, format_meta_extract, format_table_detect, format_table_structure,
    REPAIR_SUFFIX,
};
use crate::pipeline::tables::structure_grid;
use crate::traits::ChatModel;
use crate::types::{FigureRecord, MetaRecord, PageText, RawFigure, RawTable, TableRecord};

/// Strip a markdown code fence from a model reply, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Chat once, parse; on malformed output re-prompt once, then fail typed.
async fn chat_parsed<C, T, F>(chat: &C, prompt: &str, parse: F) -> ExtractResult<T>
where
    C: ChatModel,
    F: Fn(&str) -> Result<T, String>,
{
    let reply = chat.chat(prompt).await?;
    match parse(strip_code_fences(&reply)) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            debug!(error = %first_error, "model output failed to parse, re-prompting once");
            let repair = format!("{prompt}{REPAIR_SUFFIX}");
            let reply = chat.chat(&repair).await?;
            parse(strip_code_fences(&reply)).map_err(ExtractError::MalformedOutput)
        }
    }
}

/// Extract bibliographic metadata from the full paper text.
///
/// Keys the model cannot fill come back as `"none"`; the record always
/// carries the complete canonical key set.
pub async fn extract_meta<C: ChatModel>(
    chat: &C,
    pages: &[PageText],
    config: &PipelineConfig,
) -> ExtractResult<MetaRecord> {
    let mut paper = pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if paper.len() > config.max_meta_chars {
        paper = truncate_chars(&paper, config.max_meta_chars);
    }

    let prompt = format_meta_extract(&paper);
    chat_parsed(chat, &prompt, |raw| {
        serde_json::from_str::<MetaRecord>(raw).map_err(|e| e.to_string())
    })
    .await
}

/// Parse the table-detection reply: the literal `no`, or a JSON list of
/// verbatim `(table_name, table_content)` pairs.
pub fn parse_detect_response(raw: &str) -> Result<Vec<RawTable>, String> {
    let trimmed = raw.trim().trim_matches('"').trim_end_matches('.');
    if trimmed.eq_ignore_ascii_case("no") {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<RawTable>>(raw).map_err(|e| e.to_string())
}

#[derive(Deserialize)]
struct StructureResponse {
    table_caption: String,
    table_content: String,
}

/// Parse the structuring reply into (caption, CSV content).
pub fn parse_structure_response(raw: &str) -> Result<(String, String), String> {
    let parsed: StructureResponse = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok((parsed.table_caption, parsed.table_content))
}

/// Detect tables on one page. Returns verbatim regions, unprocessed.
async fn detect_page_tables<C: ChatModel>(chat: &C, page: &PageText) -> ExtractResult<Vec<RawTable>> {
    let prompt = format_table_detect(&page.text);
    chat_parsed(chat, &prompt, parse_detect_response).await
}

/// Structure one raw table into a rectangular record.
async fn structure_table<C: ChatModel>(chat: &C, raw: &RawTable) -> ExtractResult<TableRecord> {
    let prompt = format_table_structure(&raw.table_content);
    let (caption, csv_text) = chat_parsed(chat, &prompt, parse_structure_response).await?;
    let grid = structure_grid(&csv_text).map_err(ExtractError::MalformedOutput)?;
    Ok(TableRecord::new(raw.table_name.clone(), caption, grid))
}

/// Extract every table in the document.
///
/// Detection runs per page, concurrently; structuring runs per detected
/// table, concurrently. Failed pages and failed tables are skipped, but a
/// run where every page failed surfaces an error instead of caching an
/// empty result.
pub async fn extract_tables<C: ChatModel>(
    chat: &C,
    document_id: &str,
    pages: &[PageText],
) -> ExtractResult<Vec<TableRecord>> {
    let detections = join_all(pages.iter().map(|page| detect_page_tables(chat, page))).await;

    let mut raw_tables = Vec::new();
    let mut last_error = None;
    let mut failed_pages = 0;
    for (page, detection) in pages.iter().zip(detections) {
        match detection {
            Ok(tables) => raw_tables.extend(tables),
            Err(error) => {
                warn!(document = document_id, page = page.page, %error, "table detection failed, skipping page");
                failed_pages += 1;
                last_error = Some(error);
            }
        }
    }
    if failed_pages == pages.len() {
        if let Some(error) = last_error {
            return Err(error);
        }
    }

    let structured = join_all(raw_tables.iter().map(|raw| structure_table(chat, raw))).await;

    let mut records = Vec::new();
    for (raw, result) in raw_tables.iter().zip(structured) {
        match result {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(document = document_id, table = %raw.table_name, %error, "table structuring failed, skipping table");
            }
        }
    }
    Ok(records)
}

/// Describe one figure from its caption and raster image.
async fn describe_figure<C: ChatModel>(chat: &C, raw: &RawFigure) -> ExtractResult<FigureRecord> {
    let prompt = format_figure_describe(&raw.caption);
    let description = chat.chat_with_image(&prompt, &raw.image).await?;
    Ok(FigureRecord {
        caption: raw.caption.clone(),
        description,
        figure_url: raw.path.clone(),
    })
}

/// Describe every figure, 1:1 with the (caption, image) pairs provided.
///
/// Failed items are skipped; the descriptions that did succeed are kept.
/// A run where every figure failed surfaces an error instead of caching
/// an empty result.
pub async fn extract_figures<C: ChatModel>(
    chat: &C,
    document_id: &str,
    figures: &[RawFigure],
) -> ExtractResult<Vec<FigureRecord>> {
    let described = join_all(figures.iter().map(|raw| describe_figure(chat, raw))).await;

    let mut records = Vec::new();
    let mut last_error = None;
    for (raw, result) in figures.iter().zip(described) {
        match result {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(document = document_id, figure = %raw.path, %error, "figure description failed, skipping figure");
                last_error = Some(error);
            }
        }
    }
    if records.is_empty() {
        if let Some(error) = last_error {
            return Err(error);
        }
    }
    Ok(records)
}

/// Truncate to a character boundary at or below `max` bytes.
fn truncate_chars(text: &str, max: usize) -> String {
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_detect_no() {
        assert!(parse_detect_response("no").unwrap().is_empty());
        assert!(parse_detect_response("No.").unwrap().is_empty());
        assert!(parse_detect_response("\"no\"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_detect_tables() {
        let raw = r#"[{"table_name": "Table 1", "table_content": "Year Sales\n2020 100"}]"#;
        let tables = parse_detect_response(raw).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table_name, "Table 1");
        assert!(tables[0].table_content.contains("2020"));
    }

    #[test]
    fn test_parse_detect_rejects_garbage() {
        assert!(parse_detect_response("maybe there is a table").is_err());
    }

    #[test]
    fn test_parse_structure_response() {
        let raw = r#"{"table_caption": "Sales by year", "table_content": "\"Year\",\"Sales\"\n\"2020\",\"100\"\n"}"#;
        let (caption, csv) = parse_structure_response(raw).unwrap();
        assert_eq!(caption, "Sales by year");
        assert!(csv.starts_with("\"Year\""));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "aé±b";
        let truncated = truncate_chars(text, 2);
        assert!(text.starts_with(&truncated));
    }
}
