//! Table artifacts.
//!
//! Detection and structuring are separate stages: a [`RawTable`] carries
//! the verbatim page region the model pointed at, and a [`TableRecord`]
//! carries the structured rectangular grid produced from it.

use serde::{Deserialize, Serialize};

/// A detected table, verbatim from the page text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    /// Ordinal label, e.g. `Table 1`.
    pub table_name: String,

    /// The raw table region, unprocessed.
    pub table_content: String,
}

/// A structured table.
///
/// `content[0]` is the header row. Every row has the same cell count as
/// the header; blank cells are empty strings, never omitted. Header cells
/// never contain a raw line break (multi-line headers are folded before a
/// record is constructed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    /// Ordinal label, e.g. `Table 1`.
    pub table_name: String,

    /// Table caption.
    pub caption: String,

    /// Rectangular grid, header row first.
    pub content: Vec<Vec<String>>,
}

impl TableRecord {
    /// Create a record, padding the grid rectangular.
    pub fn new(
        table_name: impl Into<String>,
        caption: impl Into<String>,
        content: Vec<Vec<String>>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            caption: caption.into(),
            content: pad_rectangular(content),
        }
    }

    /// Number of columns (header width), 0 for an empty grid.
    pub fn column_count(&self) -> usize {
        self.content.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Whether every row has the header's cell count.
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.content.iter().all(|row| row.len() == width)
    }

    /// Serialize the grid as CSV with every cell quoted.
    pub fn to_csv(&self) -> String {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new());
        for row in &self.content {
            // Writing to a Vec cannot fail.
            let _ = writer.write_record(row);
        }
        let bytes = writer.into_inner().unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Pad every row to the widest row's cell count with empty strings.
///
/// Rows and columns are never dropped to make counts match.
pub fn pad_rectangular(mut grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = grid.iter().map(|row| row.len()).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(width, String::new());
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pad_short_rows() {
        let record = TableRecord::new(
            "Table 1",
            "caption",
            vec![
                vec!["Year".into(), "Sales".into()],
                vec!["2020".into()],
                vec!["2021".into(), "150".into(), "extra".into()],
            ],
        );
        assert!(record.is_rectangular());
        assert_eq!(record.column_count(), 3);
        assert_eq!(record.content[1], vec!["2020", "", ""]);
    }

    #[test]
    fn test_to_csv_quotes_every_cell() {
        let record = TableRecord::new(
            "Table 1",
            "caption",
            vec![
                vec!["Year".into(), "Sales".into()],
                vec!["2020".into(), "16 ± 0.6".into()],
            ],
        );
        let csv = record.to_csv();
        assert_eq!(csv, "\"Year\",\"Sales\"\n\"2020\",\"16 ± 0.6\"\n");
    }

    #[test]
    fn test_empty_grid() {
        let record = TableRecord::new("Table 1", "caption", vec![]);
        assert_eq!(record.column_count(), 0);
        assert!(record.is_rectangular());
        assert_eq!(record.to_csv(), "");
    }

    proptest! {
        #[test]
        fn prop_padded_grid_is_rectangular(
            rows in proptest::collection::vec(
                proptest::collection::vec(".{0,8}", 0..6),
                0..8,
            )
        ) {
            let grid = pad_rectangular(rows);
            let width = grid.first().map(|r| r.len()).unwrap_or(0);
            prop_assert!(grid.iter().all(|r| r.len() == width));
        }
    }
}
