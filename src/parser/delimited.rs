// file: src/parser/delimited.rs
// description: CSV reference exports (one row per record) to records
// reference: https://docs.rs/csv

use crate::error::Result;
use crate::models::Record;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default, alias = "Title")]
    title: Option<String>,
    #[serde(default, alias = "Abstract", alias = "abstract_note")]
    r#abstract: Option<String>,
    #[serde(default, alias = "Authors", alias = "author")]
    authors: Option<String>,
    #[serde(default, alias = "Year", alias = "publication_year")]
    year: Option<String>,
    #[serde(default, alias = "Tags", alias = "keywords", alias = "Keywords")]
    tags: Option<String>,
    #[serde(default, alias = "DOI")]
    doi: Option<String>,
    #[serde(default, alias = "Language")]
    language: Option<String>,
}

pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<Record>> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            records.push(row_to_record(row?));
        }

        debug!("Parsed {} CSV records", records.len());
        Ok(records)
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn row_to_record(row: CsvRow) -> Record {
    let tags = row.tags.unwrap_or_default();
    let mut record = Record::new(
        row.title.unwrap_or_default(),
        row.r#abstract.unwrap_or_default(),
    )
    .with_year(row.year.unwrap_or_default())
    .with_authors(split_list(&row.authors.unwrap_or_default()))
    .with_keywords(split_list(&tags));

    record.tags = tags;
    record.doi = row.doi.filter(|d| !d.trim().is_empty());
    record.language = row.language.filter(|l| !l.trim().is_empty());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_rows() {
        let data = "title,abstract,authors,year,tags\n\
                    Cargo bikes,Bikes carry parcels.,Smith; Doe,2020,logistics;cycling\n\
                    Empty,,,,\n";

        let records = CsvParser::new().parse(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].authors, vec!["Smith".to_string(), "Doe".to_string()]);
        assert_eq!(records[0].keywords, vec!["logistics".to_string(), "cycling".to_string()]);
        assert_eq!(records[0].tags, "logistics;cycling");
        assert_eq!(records[0].year, Some(2020));
        assert!(records[1].abstract_text.is_empty());
        assert_eq!(records[1].year, None);
    }

    #[test]
    fn test_capitalised_headers() {
        let data = "Title,Abstract,Year\nHubs,Text,2019\n";
        let records = CsvParser::new().parse(data.as_bytes()).unwrap();
        assert_eq!(records[0].title, "Hubs");
        assert_eq!(records[0].abstract_text, "Text");
    }
}
