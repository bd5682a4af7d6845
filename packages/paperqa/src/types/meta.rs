//! Bibliographic metadata for one paper.

use serde::{Deserialize, Serialize};

/// Sentinel value for a key the model could not fill.
pub const NONE_VALUE: &str = "none";

/// The canonical metadata keys, in prompt order.
pub const META_KEYS: [&str; 13] = [
    "Title",
    "Abstract",
    "Year",
    "Author",
    "Journal/Conference",
    "ISSN",
    "Volume",
    "Issue",
    "Page",
    "DOI",
    "Link",
    "Publisher",
    "Language",
];

fn none_value() -> String {
    NONE_VALUE.to_string()
}

/// Bibliographic metadata with every canonical key always present.
///
/// Unknown values carry the `"none"` sentinel rather than being omitted,
/// so downstream consumers can index any key unconditionally. `Page` is a
/// string in `"start-end"` or single-number form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetaRecord {
    #[serde(rename = "Title", default = "none_value")]
    pub title: String,

    #[serde(rename = "Abstract", default = "none_value")]
    pub abstract_text: String,

    #[serde(rename = "Year", default = "none_value")]
    pub year: String,

    #[serde(rename = "Author", default = "none_value")]
    pub author: String,

    #[serde(rename = "Journal/Conference", default = "none_value")]
    pub journal: String,

    #[serde(rename = "ISSN", default = "none_value")]
    pub issn: String,

    #[serde(rename = "Volume", default = "none_value")]
    pub volume: String,

    #[serde(rename = "Issue", default = "none_value")]
    pub issue: String,

    #[serde(rename = "Page", default = "none_value")]
    pub page: String,

    #[serde(rename = "DOI", default = "none_value")]
    pub doi: String,

    #[serde(rename = "Link", default = "none_value")]
    pub link: String,

    #[serde(rename = "Publisher", default = "none_value")]
    pub publisher: String,

    #[serde(rename = "Language", default = "none_value")]
    pub language: String,
}

impl Default for MetaRecord {
    fn default() -> Self {
        Self {
            title: none_value(),
            abstract_text: none_value(),
            year: none_value(),
            author: none_value(),
            journal: none_value(),
            issn: none_value(),
            volume: none_value(),
            issue: none_value(),
            page: none_value(),
            doi: none_value(),
            link: none_value(),
            publisher: none_value(),
            language: none_value(),
        }
    }
}

impl MetaRecord {
    /// Values in `META_KEYS` order.
    pub fn values(&self) -> [&str; 13] {
        [
            &self.title,
            &self.abstract_text,
            &self.year,
            &self.author,
            &self.journal,
            &self.issn,
            &self.volume,
            &self.issue,
            &self.page,
            &self.doi,
            &self.link,
            &self.publisher,
            &self.language,
        ]
    }

    /// Whether any key holds a real (non-sentinel) value.
    pub fn has_any_value(&self) -> bool {
        self.values().iter().any(|v| *v != NONE_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_become_none() {
        let record: MetaRecord =
            serde_json::from_str(r#"{"Title": "A Study", "Year": "2021"}"#).unwrap();
        assert_eq!(record.title, "A Study");
        assert_eq!(record.year, "2021");
        assert_eq!(record.doi, NONE_VALUE);
        assert_eq!(record.journal, NONE_VALUE);
    }

    #[test]
    fn test_serializes_every_canonical_key() {
        let json = serde_json::to_value(MetaRecord::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), META_KEYS.len());
        for key in META_KEYS {
            assert_eq!(object[key], NONE_VALUE, "missing key {key}");
        }
    }

    #[test]
    fn test_round_trip_preserves_key_set() {
        let record: MetaRecord = serde_json::from_str(r#"{"DOI": "10.1000/x"}"#).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json.as_object().unwrap().len(), META_KEYS.len());
        assert_eq!(json["DOI"], "10.1000/x");
    }

    #[test]
    fn test_has_any_value() {
        assert!(!MetaRecord::default().has_any_value());
        let record = MetaRecord {
            title: "A Study".into(),
            ..Default::default()
        };
        assert!(record.has_any_value());
    }
}
