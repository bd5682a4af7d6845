//! Document identity.
//!
//! A document is created on upload and immutable thereafter; its stable
//! identifier is the uploaded filename's stem, which keys every artifact
//! in the store.

use serde::{Deserialize, Serialize};

/// A paper known to the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier (filename stem).
    pub id: String,

    /// Original filename, e.g. `paper.pdf`.
    pub filename: String,
}

impl Document {
    /// Build a document from its uploaded filename.
    pub fn from_filename(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let id = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| filename.clone());
        Self { id, filename }
    }
}

/// One page of OCR text, as returned by the document-intelligence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number.
    pub page: usize,

    /// Raw page text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_filename_stem() {
        let doc = Document::from_filename("smith2021.pdf");
        assert_eq!(doc.id, "smith2021");
        assert_eq!(doc.filename, "smith2021.pdf");
    }

    #[test]
    fn test_extensionless_filename() {
        let doc = Document::from_filename("notes");
        assert_eq!(doc.id, "notes");
    }
}
