//! Document-intelligence boundary.
//!
//! The upstream OCR service owns PDF parsing and figure rendering; this
//! core only consumes its output. All methods are fallible remote calls.

use async_trait::async_trait;

use crate::error::DocIntelResult;
use crate::types::{Document, PageText, RawFigure};

/// Consumed OCR collaborator.
#[async_trait]
pub trait DocIntel: Send + Sync {
    /// Raw text of every page, in page order.
    async fn page_texts(&self, document: &Document) -> DocIntelResult<Vec<PageText>>;

    /// Rendered raster image of one page (1-based).
    async fn page_image(&self, document: &Document, page: usize) -> DocIntelResult<Vec<u8>>;

    /// Figures detected in the document, each with caption and image.
    async fn figures(&self, document: &Document) -> DocIntelResult<Vec<RawFigure>>;
}
