//! Artifact storage.
//!
//! Each kind (meta / tables / figures / pages) is its own addressable
//! artifact keyed by document id, so reading one kind never materializes
//! the others. The store does not deduplicate by content: callers decide
//! whether to skip extraction based on `get_*` returning `Some`. The unit
//! of atomicity is one record write; writes for distinct documents never
//! block each other.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{FigureRecord, MetaRecord, PageText, TableRecord};

/// Cache of extracted artifacts, keyed by document id.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Get cached metadata.
    async fn get_meta(&self, document_id: &str) -> StoreResult<Option<MetaRecord>>;

    /// Store metadata.
    async fn put_meta(&self, document_id: &str, record: &MetaRecord) -> StoreResult<()>;

    /// Get cached tables.
    async fn get_tables(&self, document_id: &str) -> StoreResult<Option<Vec<TableRecord>>>;

    /// Store tables.
    async fn put_tables(&self, document_id: &str, records: &[TableRecord]) -> StoreResult<()>;

    /// Get cached figures.
    async fn get_figures(&self, document_id: &str) -> StoreResult<Option<Vec<FigureRecord>>>;

    /// Store figures.
    async fn put_figures(&self, document_id: &str, records: &[FigureRecord]) -> StoreResult<()>;

    /// Get cached page texts.
    async fn get_pages(&self, document_id: &str) -> StoreResult<Option<Vec<PageText>>>;

    /// Store page texts.
    async fn put_pages(&self, document_id: &str, pages: &[PageText]) -> StoreResult<()>;
}
