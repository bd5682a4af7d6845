//! The QA pipeline - main entry point of the library.
//!
//! Owns the artifact store, the model boundaries, and the configuration
//! handle. Extraction populates the per-document cache idempotently; a
//! query reads cached artifacts, builds a transient evidence pool,
//! retrieves a deduplicated subset, and produces a grounded answer.
//!
//! No lock is ever held across a model call: the embedding reuse cache is
//! snapshotted before the batch call and written back after it returns.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ConfigHandle, PipelineConfig};
use crate::error::{AiResult, ExtractResult, QueryError};
use crate::pipeline::answer::answer_question;
use crate::pipeline::evaluate::{self, Metric};
use crate::pipeline::extract::{extract_figures, extract_meta, extract_tables};
use crate::pipeline::retrieve::select_evidence;
use crate::pipeline::summarize::{summarize_docs, DocSummaryInput};
use crate::traits::{ArtifactStore, ChatModel, DocIntel, Embedder};
use crate::types::{
    Document, EvidenceChunk, EvidenceKind, FigureRecord, MetaRecord, QueryResult, TableRecord,
};

/// Split text into overlapping character chunks.
pub fn chunk_text(text: &str, chunk_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_chars == 0 {
        return Vec::new();
    }
    let step = chunk_chars.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_chars).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// The retrieval-and-answer pipeline over a set of papers.
pub struct QaPipeline<S, A, D>
where
    S: ArtifactStore,
    A: ChatModel + Embedder,
    D: DocIntel,
{
    store: S,
    ai: A,
    docintel: D,
    config: ConfigHandle,
    embedding_cache: RwLock<HashMap<String, Vec<f32>>>,
}

impl<S, A, D> QaPipeline<S, A, D>
where
    S: ArtifactStore,
    A: ChatModel + Embedder,
    D: DocIntel,
{
    /// Create a pipeline with default configuration.
    pub fn new(store: S, ai: A, docintel: D) -> Self {
        Self::with_config(store, ai, docintel, PipelineConfig::default())
    }

    /// Create a pipeline with an explicit configuration.
    pub fn with_config(store: S, ai: A, docintel: D, config: PipelineConfig) -> Self {
        Self {
            store,
            ai,
            docintel,
            config: ConfigHandle::new(config),
            embedding_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Handle for atomic whole-config replacement.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Access the artifact store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Extraction (cache populate)
    // =========================================================================

    /// Populate the artifact cache for one document, idempotently.
    ///
    /// Each kind is extracted only when its artifact is absent, so
    /// re-running after a partial failure fills in just the gaps and a
    /// fully cached document does no model calls at all. Existing
    /// artifacts are never overwritten.
    pub async fn ensure_extracted(&self, document: &Document) -> ExtractResult<()> {
        let config = self.config.current();

        let pages = match self.store.get_pages(&document.id).await? {
            Some(pages) => pages,
            None => {
                info!(document = %document.id, "fetching page text");
                let pages = self.docintel.page_texts(document).await?;
                self.store.put_pages(&document.id, &pages).await?;
                pages
            }
        };

        if self.store.get_meta(&document.id).await?.is_none() {
            info!(document = %document.id, "extracting metadata");
            let meta = extract_meta(&self.ai, &pages, &config).await?;
            self.store.put_meta(&document.id, &meta).await?;
        }

        if self.store.get_tables(&document.id).await?.is_none() {
            info!(document = %document.id, "extracting tables");
            let tables = extract_tables(&self.ai, &document.id, &pages).await?;
            self.store.put_tables(&document.id, &tables).await?;
        }

        if self.store.get_figures(&document.id).await?.is_none() {
            info!(document = %document.id, "extracting figures");
            let raw = self.docintel.figures(document).await?;
            let figures = extract_figures(&self.ai, &document.id, &raw).await?;
            self.store.put_figures(&document.id, &figures).await?;
        }

        Ok(())
    }

    // =========================================================================
    // Cached artifact reads
    // =========================================================================

    /// Cached metadata for each filename; NotFound when absent.
    pub async fn cached_meta(&self, filenames: &[String]) -> Result<Vec<MetaRecord>, QueryError> {
        let mut records = Vec::with_capacity(filenames.len());
        for name in filenames {
            let document = Document::from_filename(name.clone());
            let meta = self.store.get_meta(&document.id).await?.ok_or_else(|| {
                QueryError::MissingArtifact {
                    document: name.clone(),
                }
            })?;
            records.push(meta);
        }
        Ok(records)
    }

    /// Cached tables for each filename; NotFound when absent.
    pub async fn cached_tables(
        &self,
        filenames: &[String],
    ) -> Result<Vec<Vec<TableRecord>>, QueryError> {
        let mut records = Vec::with_capacity(filenames.len());
        for name in filenames {
            let document = Document::from_filename(name.clone());
            let tables = self.store.get_tables(&document.id).await?.ok_or_else(|| {
                QueryError::MissingArtifact {
                    document: name.clone(),
                }
            })?;
            records.push(tables);
        }
        Ok(records)
    }

    /// Cached figures for each filename; NotFound when absent.
    ///
    /// URLs are stored as bare file names; the serving boundary rewrites
    /// them before they leave its interface.
    pub async fn cached_figures(
        &self,
        filenames: &[String],
    ) -> Result<Vec<Vec<FigureRecord>>, QueryError> {
        let mut records = Vec::with_capacity(filenames.len());
        for name in filenames {
            let document = Document::from_filename(name.clone());
            let figures = self.store.get_figures(&document.id).await?.ok_or_else(|| {
                QueryError::MissingArtifact {
                    document: name.clone(),
                }
            })?;
            records.push(figures);
        }
        Ok(records)
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// Assemble the transient evidence pool for the given documents.
    ///
    /// Cached page text is required (NotFound otherwise); a document whose
    /// table or figure extraction never succeeded still contributes its
    /// other artifacts.
    async fn evidence_pool(
        &self,
        filenames: &[String],
        config: &PipelineConfig,
    ) -> Result<Vec<EvidenceChunk>, QueryError> {
        let mut pool = Vec::new();
        for name in filenames {
            let document = Document::from_filename(name.clone());
            let pages = self.store.get_pages(&document.id).await?.ok_or_else(|| {
                QueryError::MissingArtifact {
                    document: name.clone(),
                }
            })?;

            for page in &pages {
                for chunk in chunk_text(&page.text, config.chunk_chars, config.chunk_overlap) {
                    pool.push(EvidenceChunk::new(&document.id, EvidenceKind::Text, chunk));
                }
            }

            match self.store.get_tables(&document.id).await? {
                Some(tables) => {
                    for table in tables {
                        let content =
                            format!("{} - {}\n{}", table.table_name, table.caption, table.to_csv());
                        pool.push(EvidenceChunk::new(&document.id, EvidenceKind::Table, content));
                    }
                }
                None => {
                    warn!(document = %document.id, "no cached tables, querying without them");
                }
            }

            match self.store.get_figures(&document.id).await? {
                Some(figures) => {
                    for figure in figures {
                        let content = format!("{}\n{}", figure.caption, figure.description);
                        pool.push(EvidenceChunk::new(
                            &document.id,
                            EvidenceKind::Figure,
                            content,
                        ));
                    }
                }
                None => {
                    warn!(document = %document.id, "no cached figures, querying without them");
                }
            }
        }
        Ok(pool)
    }

    /// Embed the pool, reusing cached embeddings for identical content.
    ///
    /// The batch call preserves input order, so `result[i]` always lands
    /// on the chunk that produced `texts[i]`.
    async fn embed_pool(&self, pool: &mut [EvidenceChunk]) -> Result<(), QueryError> {
        let keys: Vec<String> = pool.iter().map(|chunk| chunk.content_key()).collect();

        let mut missing_indices = Vec::new();
        {
            let cache = self.embedding_cache.read().unwrap();
            for (i, chunk) in pool.iter_mut().enumerate() {
                match cache.get(&keys[i]) {
                    Some(embedding) => chunk.embedding = embedding.clone(),
                    None => missing_indices.push(i),
                }
            }
        }
        if missing_indices.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = missing_indices
            .iter()
            .map(|&i| pool[i].content.as_str())
            .collect();
        let embeddings = self.ai.embed_batch(&texts).await?;

        let mut cache = self.embedding_cache.write().unwrap();
        for (&i, embedding) in missing_indices.iter().zip(embeddings) {
            cache.insert(keys[i].clone(), embedding.clone());
            pool[i].embedding = embedding;
        }
        Ok(())
    }

    /// Answer a question over the selected documents.
    ///
    /// `budget` overrides the configured evidence budget when given.
    pub async fn ask(
        &self,
        question: &str,
        filenames: &[String],
        budget: Option<usize>,
    ) -> Result<QueryResult, QueryError> {
        let config = self.config.current();
        let budget = budget.unwrap_or(config.evidence_budget);

        let mut pool = self.evidence_pool(filenames, &config).await?;
        debug!(chunks = pool.len(), budget, "assembled evidence pool");
        if pool.is_empty() {
            return Ok(QueryResult::no_evidence());
        }

        let question_embedding = self.ai.embed(question).await?;
        self.embed_pool(&mut pool).await?;

        let selected = select_evidence(&question_embedding, pool, budget, &config);
        debug!(selected = selected.len(), "selected evidence");

        answer_question(&self.ai, question, &selected, &config).await
    }

    /// `ask` that abandons in-flight work when the token fires.
    ///
    /// Cache populates are not tied to any query: callers spawn
    /// `ensure_extracted` detached so it runs to completion even when the
    /// query that wanted it is gone.
    pub async fn ask_with_cancel(
        &self,
        question: &str,
        filenames: &[String],
        budget: Option<usize>,
        cancel: CancellationToken,
    ) -> Result<QueryResult, QueryError> {
        tokio::select! {
            result = self.ask(question, filenames, budget) => result,
            _ = cancel.cancelled() => Err(QueryError::Cancelled),
        }
    }

    /// Summarize papers from their titles and abstracts.
    pub async fn summarize(&self, docs: &[DocSummaryInput]) -> AiResult<String> {
        summarize_docs(&self.ai, docs).await
    }

    /// Grade an answer against its question.
    pub async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        contexts: &str,
        metrics: &[Metric],
    ) -> AiResult<HashMap<String, f64>> {
        evaluate::score(&self.ai, question, answer, contexts, metrics).await
    }
}
