// file: src/parser/mendeley.rs
// description: Mendeley JSON metadata (API documents or saved exports) to records
// reference: https://dev.mendeley.com/methods/#documents

use crate::error::Result;
use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MendeleyDocument {
    #[serde(default)]
    pub title: Option<String>,
    /// Saved exports write `null` for authors without a last name.
    #[serde(default)]
    pub authors: Vec<Option<MendeleyAuthor>>,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub identifiers: HashMap<String, String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Saved exports keep only last names, the API returns objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MendeleyAuthor {
    Name(String),
    Person {
        #[serde(default)]
        first_name: Option<String>,
        #[serde(default)]
        last_name: Option<String>,
    },
}

impl MendeleyAuthor {
    pub fn display_name(&self) -> Option<String> {
        match self {
            MendeleyAuthor::Name(name) => Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            MendeleyAuthor::Person {
                first_name,
                last_name,
            } => match (last_name.as_deref(), first_name.as_deref()) {
                (Some(last), Some(first)) if !first.trim().is_empty() => {
                    Some(format!("{}, {}", last.trim(), first.trim()))
                }
                (Some(last), _) if !last.trim().is_empty() => Some(last.trim().to_string()),
                _ => None,
            },
        }
    }
}

impl MendeleyDocument {
    pub fn into_record(self) -> Record {
        let raw_year = match &self.year {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        let authors = self
            .authors
            .iter()
            .flatten()
            .filter_map(MendeleyAuthor::display_name)
            .collect();
        let keywords = self.keywords.unwrap_or_default();

        let mut record = Record::new(
            self.title.unwrap_or_default(),
            self.abstract_text.unwrap_or_default(),
        )
        .with_year(raw_year)
        .with_authors(authors)
        .with_keywords(keywords.clone());

        record.tags = keywords.join("; ");
        record.publication_type = self.doc_type;
        record.source = self.source;
        record.language = self.language;
        record.doi = self.identifiers.get("doi").cloned();
        record
    }
}

pub struct MendeleyParser;

impl MendeleyParser {
    pub fn new() -> Self {
        Self
    }

    /// Accepts a JSON array of Mendeley documents or of previously saved records.
    pub fn parse(&self, content: &str) -> Result<Vec<Record>> {
        let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let mut records = Vec::with_capacity(values.len());

        for value in values {
            if looks_like_record(&value) {
                let mut record: Record = serde_json::from_value(value)?;
                if record.year.is_none() && !record.raw_year.is_empty() {
                    record.year = crate::models::extract_year(&record.raw_year);
                }
                records.push(record);
            } else {
                let document: MendeleyDocument = serde_json::from_value(value)?;
                records.push(document.into_record());
            }
        }

        debug!("Parsed {} JSON records", records.len());
        Ok(records)
    }
}

impl Default for MendeleyParser {
    fn default() -> Self {
        Self::new()
    }
}

fn looks_like_record(value: &serde_json::Value) -> bool {
    value.get("id").is_some_and(|id| id.is_string())
        && value.get("identifiers").is_none()
        && value
            .get("authors")
            .and_then(|a| a.as_array())
            .is_none_or(|authors| authors.iter().all(|a| a.is_string()))
        && value.get("type").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_documents() {
        let content = r#"[
            {
                "id": "b1c2",
                "title": "Urban consolidation centres",
                "type": "journal",
                "year": 2020,
                "authors": [{"first_name": "Ana", "last_name": "Silva"}, {"last_name": "Ng"}],
                "keywords": ["freight", "city logistics"],
                "abstract": "Consolidation reduces trips.",
                "identifiers": {"doi": "10.1/abc"}
            }
        ]"#;

        let records = MendeleyParser::new().parse(content).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "Urban consolidation centres");
        assert_eq!(record.authors, vec!["Silva, Ana".to_string(), "Ng".to_string()]);
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.doi.as_deref(), Some("10.1/abc"));
        assert_eq!(record.publication_type.as_deref(), Some("journal"));
        assert_eq!(record.tags, "freight; city logistics");
    }

    #[test]
    fn test_parse_saved_export_with_nulls() {
        let content = r#"[
            {"title": "No abstract", "authors": ["Smith"], "year": "2018", "type": null,
             "source": null, "keywords": null, "abstract": null}
        ]"#;

        let records = MendeleyParser::new().parse(content).unwrap();
        assert_eq!(records[0].authors, vec!["Smith".to_string()]);
        assert_eq!(records[0].year, Some(2018));
        assert!(records[0].abstract_text.is_empty());
        assert!(records[0].keywords.is_empty());
    }

    #[test]
    fn test_null_author_skipped() {
        let content = r#"[
            {"title": "Lockers", "authors": ["Smith", null], "year": 2021,
             "abstract": "Parcel lockers at stations."}
        ]"#;

        let records = MendeleyParser::new().parse(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].authors, vec!["Smith".to_string()]);
        assert_eq!(records[0].title, "Lockers");
    }

    #[test]
    fn test_parse_cleaned_records_round_trip() {
        let original = vec![Record::new("Saved", "Body").with_year("2022")];
        let json = serde_json::to_string(&original).unwrap();

        let records = MendeleyParser::new().parse(&json).unwrap();
        assert_eq!(records, original);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(MendeleyParser::new().parse(r#"{"title": "x"}"#).is_err());
    }
}
