//! Pipeline configuration.
//!
//! Components never read ambient process state; the server constructs one
//! `PipelineConfig` at startup and passes it into each constructor. Runtime
//! reconfiguration replaces the whole value through [`ConfigHandle`], never
//! a single field at a time.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Tuning knobs for extraction, retrieval, and answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum evidence chunks retained after similarity ranking.
    ///
    /// Callers may override this per query.
    pub evidence_budget: usize,

    /// Number of clusters used to deduplicate the retained evidence.
    ///
    /// One representative per cluster survives. Pools at or below this
    /// size skip clustering entirely.
    pub cluster_count: usize,

    /// Iteration cap for the clustering pass.
    pub kmeans_iters: usize,

    /// Optional projection dimension applied before clustering.
    ///
    /// `None` clusters in the embedding's native dimension.
    pub reduce_dim: Option<usize>,

    /// Target characters per text evidence chunk.
    pub chunk_chars: usize,

    /// Overlap carried between adjacent text chunks.
    pub chunk_overlap: usize,

    /// Ceiling on total evidence characters in the grounding prompt.
    pub max_prompt_chars: usize,

    /// Ceiling on paper characters sent to metadata extraction.
    pub max_meta_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            evidence_budget: 75,
            cluster_count: 12,
            kmeans_iters: 8,
            reduce_dim: None,
            chunk_chars: 1200,
            chunk_overlap: 180,
            max_prompt_chars: 48_000,
            max_meta_chars: 32_000,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evidence budget.
    pub fn with_evidence_budget(mut self, budget: usize) -> Self {
        self.evidence_budget = budget;
        self
    }

    /// Set the cluster count.
    pub fn with_cluster_count(mut self, count: usize) -> Self {
        self.cluster_count = count;
        self
    }

    /// Set the projection dimension.
    pub fn with_reduce_dim(mut self, dim: usize) -> Self {
        self.reduce_dim = Some(dim);
        self
    }

    /// Set text chunking parameters.
    pub fn with_chunking(mut self, chars: usize, overlap: usize) -> Self {
        self.chunk_chars = chars;
        self.chunk_overlap = overlap;
        self
    }
}

/// Shared handle to a config that is swapped atomically as a whole.
///
/// Readers snapshot an `Arc` and keep using it for the duration of one
/// pipeline invocation; a concurrent `replace` never exposes a partially
/// updated value.
#[derive(Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<PipelineConfig>>>,
}

impl ConfigHandle {
    /// Wrap an initial config.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Snapshot the current config.
    pub fn current(&self) -> Arc<PipelineConfig> {
        self.inner.read().unwrap().clone()
    }

    /// Replace the config wholesale.
    pub fn replace(&self, config: PipelineConfig) {
        *self.inner.write().unwrap() = Arc::new(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.evidence_budget, 75);
        assert!(config.reduce_dim.is_none());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_evidence_budget(20)
            .with_cluster_count(4)
            .with_reduce_dim(16);
        assert_eq!(config.evidence_budget, 20);
        assert_eq!(config.cluster_count, 4);
        assert_eq!(config.reduce_dim, Some(16));
    }

    #[test]
    fn test_handle_swaps_whole_value() {
        let handle = ConfigHandle::new(PipelineConfig::default());
        let before = handle.current();

        handle.replace(PipelineConfig::new().with_evidence_budget(10));

        assert_eq!(before.evidence_budget, 75);
        assert_eq!(handle.current().evidence_budget, 10);
    }
}
