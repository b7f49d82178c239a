// file: src/cleaning/normalizer.rs
// description: whitespace, tag and year normalization for loaded records
// reference: record cleaning before screening

use crate::models::{Record, extract_year};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub kept: Vec<Record>,
    /// Records whose abstract was empty after trimming.
    pub dropped: Vec<Record>,
}

pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, mut record: Record) -> Record {
        record.title = collapse_whitespace(&record.title);
        record.abstract_text = record.abstract_text.trim().to_string();
        record.tags = record.tags.replace(';', ",").trim().to_string();
        record.authors = record
            .authors
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        record.keywords = record
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if !record.raw_year.is_empty() {
            record.year = extract_year(&record.raw_year);
        }

        record.refresh_id();
        record
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes every record and drops the ones without an abstract.
pub fn clean_records(records: Vec<Record>) -> CleanOutcome {
    let normalizer = RecordNormalizer::new();
    let mut outcome = CleanOutcome::default();

    for record in records {
        let record = normalizer.normalize(record);
        if record.abstract_text.is_empty() {
            debug!("Dropping record without abstract: {}", record.id);
            outcome.dropped.push(record);
        } else {
            outcome.kept.push(record);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_empty_abstracts() {
        let records = vec![
            Record::new("Kept", "  has abstract  "),
            Record::new("Blank", "   \n "),
            Record::new("Missing", ""),
        ];

        let outcome = clean_records(records);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].abstract_text, "has abstract");
        assert_eq!(outcome.dropped.len(), 2);
    }

    #[test]
    fn test_normalize_fields() {
        let mut record = Record::new("  Micro   hubs \n", "text").with_year("c. 2017 (online)");
        record.tags = " logistics; freight ".to_string();
        record.authors = vec![" Smith ".to_string(), "".to_string()];

        let cleaned = RecordNormalizer::new().normalize(record);
        assert_eq!(cleaned.title, "Micro hubs");
        assert_eq!(cleaned.tags, "logistics, freight");
        assert_eq!(cleaned.year, Some(2017));
        assert_eq!(cleaned.authors, vec!["Smith".to_string()]);
        assert_eq!(cleaned.id, Record::compute_id("Micro hubs", Some(2017)));
    }

    #[test]
    fn test_year_without_digits_becomes_none() {
        let record = Record::new("T", "A").with_year("in press");
        let cleaned = RecordNormalizer::new().normalize(record);
        assert_eq!(cleaned.year, None);
    }
}
