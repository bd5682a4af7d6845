//! Figure artifacts.

use serde::{Deserialize, Serialize};

/// A figure as delivered by the document-intelligence boundary.
#[derive(Debug, Clone)]
pub struct RawFigure {
    /// Caption text found near the figure.
    pub caption: String,

    /// Raster image bytes (JPEG).
    pub image: Vec<u8>,

    /// File name of the rendered figure image, e.g. `paper_fig_1.jpg`.
    pub path: String,
}

/// A described figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Caption text.
    pub caption: String,

    /// Model-generated description of the data insight.
    pub description: String,

    /// Figure image reference. Persisted as a bare file name; rewritten to
    /// the serving boundary's canonical URL before leaving the interface.
    pub figure_url: String,
}

impl FigureRecord {
    /// Rewrite `figure_url` against the serving base, collapsing any stored
    /// path down to its file name first.
    pub fn resolved_against(mut self, base: &str) -> Self {
        let name = self
            .figure_url
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.figure_url)
            .to_string();
        self.figure_url = format!("{}/{}", base.trim_end_matches('/'), name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> FigureRecord {
        FigureRecord {
            caption: "Figure 1".into(),
            description: "desc".into(),
            figure_url: url.into(),
        }
    }

    #[test]
    fn test_resolves_bare_name() {
        let resolved = record("fig_1.jpg").resolved_against("http://host/api/images");
        assert_eq!(resolved.figure_url, "http://host/api/images/fig_1.jpg");
    }

    #[test]
    fn test_strips_absolute_paths_from_any_os() {
        let unix = record("/data/output/fig_1.jpg").resolved_against("http://host/api/images/");
        assert_eq!(unix.figure_url, "http://host/api/images/fig_1.jpg");

        let windows =
            record("C:\\data\\output\\fig_1.jpg").resolved_against("http://host/api/images");
        assert_eq!(windows.figure_url, "http://host/api/images/fig_1.jpg");
    }
}
