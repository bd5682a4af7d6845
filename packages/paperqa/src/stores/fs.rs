//! On-disk artifact store.
//!
//! One JSON file per (document, kind) under `<root>/{meta,table,figure,
//! pages}/<id>.json`, mirroring how artifacts are addressed: reading one
//! kind never touches the others, and writes for distinct documents are
//! independent files with no shared lock. A write goes to a temp file and
//! is renamed into place, so readers only ever see a whole record.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::StoreResult;
use crate::traits::ArtifactStore;
use crate::types::{FigureRecord, MetaRecord, PageText, TableRecord};

/// Stored envelope adding an extraction timestamp to each artifact.
#[derive(Debug, Serialize, Deserialize)]
struct Stored<T> {
    extracted_at: DateTime<Utc>,
    record: T,
}

/// Artifact store rooted at a data directory.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Open a store rooted at `root`, creating the kind directories.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for kind in ["meta", "table", "figure", "pages"] {
            fs::create_dir_all(root.join(kind)).await?;
        }
        Ok(Self { root })
    }

    fn path(&self, kind: &str, document_id: &str) -> PathBuf {
        self.root.join(kind).join(format!("{document_id}.json"))
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Option<T>> {
        match fs::read(path).await {
            Ok(bytes) => {
                let stored: Stored<T> = serde_json::from_slice(&bytes)?;
                Ok(Some(stored.record))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn write<T: Serialize>(&self, path: &Path, record: &T) -> StoreResult<()> {
        let stored = Stored {
            extracted_at: Utc::now(),
            record,
        };
        let bytes = serde_json::to_vec_pretty(&stored)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn get_meta(&self, document_id: &str) -> StoreResult<Option<MetaRecord>> {
        self.read(&self.path("meta", document_id)).await
    }

    async fn put_meta(&self, document_id: &str, record: &MetaRecord) -> StoreResult<()> {
        self.write(&self.path("meta", document_id), record).await
    }

    async fn get_tables(&self, document_id: &str) -> StoreResult<Option<Vec<TableRecord>>> {
        self.read(&self.path("table", document_id)).await
    }

    async fn put_tables(&self, document_id: &str, records: &[TableRecord]) -> StoreResult<()> {
        self.write(&self.path("table", document_id), &records).await
    }

    async fn get_figures(&self, document_id: &str) -> StoreResult<Option<Vec<FigureRecord>>> {
        self.read(&self.path("figure", document_id)).await
    }

    async fn put_figures(&self, document_id: &str, records: &[FigureRecord]) -> StoreResult<()> {
        self.write(&self.path("figure", document_id), &records).await
    }

    async fn get_pages(&self, document_id: &str) -> StoreResult<Option<Vec<PageText>>> {
        self.read(&self.path("pages", document_id)).await
    }

    async fn put_pages(&self, document_id: &str, pages: &[PageText]) -> StoreResult<()> {
        self.write(&self.path("pages", document_id), &pages).await
    }
}
