// file: src/cleaning/dedup.rs
// description: duplicate detection by DOI or normalized title and year

use crate::models::{Record, normalize_title};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateMatch {
    Doi(String),
    Title(String),
}

impl DuplicateMatch {
    pub fn reason(&self) -> String {
        match self {
            DuplicateMatch::Doi(first_id) => format!("duplicate_doi:{}", first_id),
            DuplicateMatch::Title(first_id) => format!("duplicate_title:{}", first_id),
        }
    }
}

/// Remembers every record it has seen; the first occurrence wins.
#[derive(Debug, Default)]
pub struct Deduplicator {
    by_doi: HashMap<String, String>,
    by_title: HashMap<(String, Option<i32>), String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, record: &Record) -> Option<DuplicateMatch> {
        let doi = record
            .doi
            .as_deref()
            .map(normalize_doi)
            .filter(|d| !d.is_empty());

        if let Some(doi) = &doi
            && let Some(first) = self.by_doi.get(doi)
        {
            return Some(DuplicateMatch::Doi(first.clone()));
        }

        let title = normalize_title(&record.title);
        let title_key = (title, record.year);
        if !title_key.0.is_empty()
            && let Some(first) = self.by_title.get(&title_key)
        {
            return Some(DuplicateMatch::Title(first.clone()));
        }

        if let Some(doi) = doi {
            self.by_doi.insert(doi, record.id.clone());
        }
        if !title_key.0.is_empty() {
            self.by_title.insert(title_key, record.id.clone());
        }
        None
    }

    /// Splits records into unique ones and (duplicate, match) pairs.
    pub fn partition(records: Vec<Record>) -> (Vec<Record>, Vec<(Record, DuplicateMatch)>) {
        let mut dedup = Self::new();
        let mut unique = Vec::new();
        let mut duplicates = Vec::new();

        for record in records {
            match dedup.check(&record) {
                Some(found) => duplicates.push((record, found)),
                None => unique.push(record),
            }
        }

        (unique, duplicates)
    }
}

fn normalize_doi(doi: &str) -> String {
    let lowered = doi.trim().to_lowercase();
    lowered
        .trim_start_matches("https://doi.org/")
        .trim_start_matches("http://dx.doi.org/")
        .trim_start_matches("doi:")
        .trim()
        .to_string()
}
