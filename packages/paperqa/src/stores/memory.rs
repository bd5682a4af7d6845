//! In-memory artifact store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::ArtifactStore;
use crate::types::{FigureRecord, MetaRecord, PageText, TableRecord};

/// In-memory store. Data is lost on restart; not for production.
#[derive(Default)]
pub struct MemoryArtifactStore {
    meta: RwLock<HashMap<String, MetaRecord>>,
    tables: RwLock<HashMap<String, Vec<TableRecord>>>,
    figures: RwLock<HashMap<String, Vec<FigureRecord>>>,
    pages: RwLock<HashMap<String, Vec<PageText>>>,
}

impl MemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored artifacts.
    pub fn clear(&self) {
        self.meta.write().unwrap().clear();
        self.tables.write().unwrap().clear();
        self.figures.write().unwrap().clear();
        self.pages.write().unwrap().clear();
    }

    /// Number of documents with cached metadata.
    pub fn meta_count(&self) -> usize {
        self.meta.read().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get_meta(&self, document_id: &str) -> StoreResult<Option<MetaRecord>> {
        Ok(self.meta.read().unwrap().get(document_id).cloned())
    }

    async fn put_meta(&self, document_id: &str, record: &MetaRecord) -> StoreResult<()> {
        self.meta
            .write()
            .unwrap()
            .insert(document_id.to_string(), record.clone());
        Ok(())
    }

    async fn get_tables(&self, document_id: &str) -> StoreResult<Option<Vec<TableRecord>>> {
        Ok(self.tables.read().unwrap().get(document_id).cloned())
    }

    async fn put_tables(&self, document_id: &str, records: &[TableRecord]) -> StoreResult<()> {
        self.tables
            .write()
            .unwrap()
            .insert(document_id.to_string(), records.to_vec());
        Ok(())
    }

    async fn get_figures(&self, document_id: &str) -> StoreResult<Option<Vec<FigureRecord>>> {
        Ok(self.figures.read().unwrap().get(document_id).cloned())
    }

    async fn put_figures(&self, document_id: &str, records: &[FigureRecord]) -> StoreResult<()> {
        self.figures
            .write()
            .unwrap()
            .insert(document_id.to_string(), records.to_vec());
        Ok(())
    }

    async fn get_pages(&self, document_id: &str) -> StoreResult<Option<Vec<PageText>>> {
        Ok(self.pages.read().unwrap().get(document_id).cloned())
    }

    async fn put_pages(&self, document_id: &str, pages: &[PageText]) -> StoreResult<()> {
        self.pages
            .write()
            .unwrap()
            .insert(document_id.to_string(), pages.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_clear() {
        let store = MemoryArtifactStore::new();
        assert!(store.get_meta("doc").await.unwrap().is_none());

        store.put_meta("doc", &MetaRecord::default()).await.unwrap();
        assert!(store.get_meta("doc").await.unwrap().is_some());
        assert_eq!(store.meta_count(), 1);

        store.clear();
        assert!(store.get_meta("doc").await.unwrap().is_none());
    }
}
