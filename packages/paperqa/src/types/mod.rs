//! Domain types for papers and their extracted artifacts.

pub mod document;
pub mod evidence;
pub mod figure;
pub mod meta;
pub mod table;

pub use document::{Document, PageText};
pub use evidence::{EvidenceChunk, EvidenceKind, QueryResult};
pub use figure::{FigureRecord, RawFigure};
pub use meta::MetaRecord;
pub use table::{RawTable, TableRecord};
