//! Scientific-paper extraction and retrieval-grounded QA.
//!
//! Ingested papers are turned into cached artifacts - bibliographic
//! metadata, structured tables, described figures, page text - and
//! natural-language questions over a selected set of papers are answered
//! from the smallest sufficient evidence: chunks are ranked against the
//! question, clustered to drop near-duplicates, and handed to the chat
//! model in one grounded prompt.
//!
//! # Design
//!
//! - Extraction is cached per document and idempotent; repeated queries
//!   never re-run it
//! - The chat model, embedding model, OCR service, and store sit behind
//!   traits; the pipeline owns prompts and parsing, providers own
//!   transport
//! - Model output is never trusted: every response parses into a typed
//!   value or surfaces a typed failure
//! - "No relevant evidence" is a valid answer state, distinct from any
//!   provider failure
//!
//! # Usage
//!
//! ```rust,ignore
//! use paperqa::{Document, FsArtifactStore, HttpDocIntel, OpenAi, QaPipeline};
//!
//! let store = FsArtifactStore::open("./data").await?;
//! let ai = OpenAi::from_env()?;
//! let docintel = HttpDocIntel::new(endpoint, key);
//! let pipeline = QaPipeline::new(store, ai, docintel);
//!
//! pipeline.ensure_extracted(&Document::from_filename("smith2021.pdf")).await?;
//! let result = pipeline
//!     .ask("What was the yield?", &["smith2021.pdf".into()], None)
//!     .await?;
//! println!("{}", result.answer);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - model, OCR, and store boundaries
//! - [`types`] - documents, artifacts, evidence
//! - [`pipeline`] - extraction, retrieval, answering, evaluation
//! - [`stores`] - artifact store implementations
//! - [`ai`] - provider clients
//! - [`docintel`] - OCR gateway client
//! - [`testing`] - mocks for exercising the pipeline offline

pub mod ai;
pub mod config;
pub mod docintel;
pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{ConfigHandle, PipelineConfig};
pub use error::{AiError, DocIntelError, ExtractError, QueryError, StoreError};
pub use traits::{ArtifactStore, ChatModel, DocIntel, Embedder};
pub use types::{
    Document, EvidenceChunk, EvidenceKind, FigureRecord, MetaRecord, PageText, QueryResult,
    RawFigure, RawTable, TableRecord,
};

// Re-export the pipeline entry point and its side operations
pub use pipeline::{DocSummaryInput, Metric, QaPipeline};

// Re-export stores and provider clients
pub use ai::OpenAi;
pub use docintel::HttpDocIntel;
pub use stores::{FsArtifactStore, MemoryArtifactStore};
