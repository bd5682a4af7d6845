//! End-to-end pipeline tests over mocks and the in-memory store.

use paperqa::pipeline::QaPipeline;
use paperqa::testing::{MockAi, MockDocIntel};
use paperqa::types::{Document, QueryResult, RawFigure};
use paperqa::{MemoryArtifactStore, QueryError};

const PAGE_ONE: &str = "Introduction. This paper studies annual sales trends \
across two fiscal years and discusses seasonal effects.";
const PAGE_TWO: &str = "Table 1. Annual sales.\nYear Sales\n2020 100\n2021 150";

fn sales_doc_ai() -> MockAi {
    let meta_reply = serde_json::json!({
        "Title": "Annual Sales Study",
        "Year": "2021",
        "Author": "Smith, J."
    })
    .to_string();

    let detect_reply = serde_json::json!([{
        "table_name": "Table 1",
        "table_content": "Year Sales\n2020 100\n2021 150"
    }])
    .to_string();

    let structure_reply = serde_json::json!({
        "table_caption": "Annual sales.",
        "table_content": "\"Year\nSales\"\n\"2020\",\"100\"\n\"2021\",\"150\"\n"
    })
    .to_string();

    let answer_reply = serde_json::json!({
        "summary": "Retrieved the annual sales table and surrounding text.",
        "answer": "Sales rose from 100 in 2020 to 150 in 2021."
    })
    .to_string();

    // Rule order matters: later prompts embed earlier content (the answer
    // prompt carries page text), so the most specific markers come first.
    MockAi::new()
        .with_reply("meta information of the given paper", meta_reply)
        .with_reply("organize it in a CSV format", structure_reply)
        .with_reply("describe the data insight", "The figure shows steady sales growth.")
        .with_reply("You are answering a question", answer_reply)
        .with_reply("2020 100", detect_reply)
    // Unmatched prompts (page one's table detection) fall back to "no".
}

fn sales_doc_docintel() -> MockDocIntel {
    MockDocIntel::new()
        .with_pages("smith2021", &[PAGE_ONE, PAGE_TWO])
        .with_figures(
            "smith2021",
            vec![RawFigure {
                caption: "Figure 1. Sales growth over time.".into(),
                image: vec![0xFF, 0xD8, 0xFF],
                path: "smith2021_fig_1.jpg".into(),
            }],
        )
}

#[tokio::test]
async fn extracts_two_page_document_with_sibling_header_table() {
    let pipeline = QaPipeline::new(MemoryArtifactStore::new(), sales_doc_ai(), sales_doc_docintel());
    let document = Document::from_filename("smith2021.pdf");

    pipeline.ensure_extracted(&document).await.unwrap();

    let meta = pipeline
        .cached_meta(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert_eq!(meta[0].title, "Annual Sales Study");
    assert_eq!(meta[0].year, "2021");
    // Keys the model could not fill carry the sentinel, never vanish.
    assert_eq!(meta[0].doi, "none");
    assert_eq!(meta[0].issn, "none");

    let tables = pipeline
        .cached_tables(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert_eq!(tables[0].len(), 1);
    let table = &tables[0][0];
    assert_eq!(table.table_name, "Table 1");
    assert_eq!(table.caption, "Annual sales.");
    // "Year\nSales" against two data columns is two sibling headers.
    assert_eq!(table.content[0], vec!["Year", "Sales"]);
    assert_eq!(table.content[1], vec!["2020", "100"]);
    assert_eq!(table.content[2], vec!["2021", "150"]);
    assert!(table.is_rectangular());

    let figures = pipeline
        .cached_figures(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert_eq!(figures[0].len(), 1);
    assert_eq!(figures[0][0].description, "The figure shows steady sales growth.");
    assert_eq!(figures[0][0].figure_url, "smith2021_fig_1.jpg");
}

#[tokio::test]
async fn repeated_extraction_is_a_no_op() {
    let ai = sales_doc_ai();
    let probe = ai.clone();
    let pipeline = QaPipeline::new(MemoryArtifactStore::new(), ai, sales_doc_docintel());
    let document = Document::from_filename("smith2021.pdf");

    pipeline.ensure_extracted(&document).await.unwrap();
    let first_run = pipeline
        .cached_tables(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert!(probe.chat_call_count() > 0);

    // Second run finds every artifact cached and makes no model calls.
    probe.clear_calls();
    pipeline.ensure_extracted(&document).await.unwrap();
    assert_eq!(probe.chat_call_count(), 0);

    let second_run = pipeline
        .cached_tables(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert_eq!(first_run[0].len(), second_run[0].len());
    assert_eq!(first_run[0][0].content, second_run[0][0].content);

    // The cached record still carries the complete canonical key set.
    let meta = pipeline
        .cached_meta(&["smith2021.pdf".into()])
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&meta[0])
            .unwrap()
            .as_object()
            .unwrap()
            .len(),
        13
    );
}

#[tokio::test]
async fn ask_answers_from_cached_artifacts() {
    let pipeline = QaPipeline::new(MemoryArtifactStore::new(), sales_doc_ai(), sales_doc_docintel());
    let document = Document::from_filename("smith2021.pdf");
    pipeline.ensure_extracted(&document).await.unwrap();

    let result = pipeline
        .ask("How did sales change?", &["smith2021.pdf".into()], None)
        .await
        .unwrap();

    assert!(result.answer.contains("150"));
    assert!(!result.summary.is_empty());
}

#[tokio::test]
async fn ask_with_no_documents_reports_no_evidence() {
    let ai = MockAi::new();
    let pipeline = QaPipeline::new(MemoryArtifactStore::new(), ai, MockDocIntel::new());

    let result = pipeline.ask("What is the yield?", &[], None).await.unwrap();

    assert_eq!(result, QueryResult::no_evidence());
    assert!(result.answer.contains("cannot find an answer"));
}

#[tokio::test]
async fn ask_on_unextracted_document_is_not_found() {
    let pipeline =
        QaPipeline::new(MemoryArtifactStore::new(), MockAi::new(), MockDocIntel::new());

    let error = pipeline
        .ask("What is the yield?", &["never-extracted.pdf".into()], None)
        .await
        .unwrap_err();

    assert!(matches!(error, QueryError::MissingArtifact { .. }));
}

#[tokio::test]
async fn cached_meta_on_unknown_document_is_not_found() {
    let pipeline =
        QaPipeline::new(MemoryArtifactStore::new(), MockAi::new(), MockDocIntel::new());

    let error = pipeline
        .cached_meta(&["missing.pdf".into()])
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        QueryError::MissingArtifact { document } if document == "missing.pdf"
    ));
}

#[tokio::test]
async fn one_bad_table_does_not_abort_the_rest() {
    let detect_reply = serde_json::json!([
        {"table_name": "Table 1", "table_content": "GOODTABLE a b"},
        {"table_name": "Table 2", "table_content": "BADTABLE c d"}
    ])
    .to_string();

    let good_structure = serde_json::json!({
        "table_caption": "Good one.",
        "table_content": "\"a\",\"b\"\n\"1\",\"2\"\n"
    })
    .to_string();

    let ai = MockAi::new()
        .with_reply("meta information of the given paper", "{}")
        .with_reply("GOODTABLE", good_structure)
        .with_reply("BADTABLE", "this is not json, twice")
        .with_reply("tables here", detect_reply)
        .with_default_reply("no");

    let docintel = MockDocIntel::new().with_pages("doc", &["page with tables here"]);
    let pipeline = QaPipeline::new(MemoryArtifactStore::new(), ai, docintel);

    pipeline
        .ensure_extracted(&Document::from_filename("doc.pdf"))
        .await
        .unwrap();

    let tables = pipeline.cached_tables(&["doc.pdf".into()]).await.unwrap();
    assert_eq!(tables[0].len(), 1);
    assert_eq!(tables[0][0].caption, "Good one.");
}
