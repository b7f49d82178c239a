// file: src/parser/ris.rs
// description: RIS citation export parser
// reference: https://en.wikipedia.org/wiki/RIS_(file_format)

use crate::error::{PipelineError, Result};
use crate::models::Record;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

lazy_static! {
    // "TY  - JOUR"; some exporters drop the space after the dash on empty fields.
    static ref RIS_LINE: Regex =
        Regex::new(r"^([A-Z][A-Z0-9])\s{1,2}-\s?(.*)$").expect("RIS_LINE regex is valid");
}

const MULTI_VALUE_TAGS: &[&str] = &["AU", "A1", "A2", "A3", "A4", "KW"];

const TITLE_TAGS: &[&str] = &["TI", "T1"];
const ABSTRACT_TAGS: &[&str] = &["AB", "N2"];
const AUTHOR_TAGS: &[&str] = &["AU", "A1"];
const YEAR_TAGS: &[&str] = &["PY", "Y1", "DA"];
const SOURCE_TAGS: &[&str] = &["JO", "JF", "T2", "JA"];

pub struct RisParser;

/// Raw tag/value pairs of one `TY ... ER` block.
#[derive(Debug, Clone, Default)]
pub struct RisEntry {
    pub reference_type: String,
    fields: BTreeMap<String, Vec<String>>,
}

impl RisEntry {
    pub fn new(reference_type: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            fields: BTreeMap::new(),
        }
    }

    fn push(&mut self, tag: &str, value: String) {
        if value.is_empty() {
            return;
        }
        self.fields.entry(tag.to_string()).or_default().push(value);
    }

    /// Extends the last value of `tag`; false when the line has no field to belong to.
    fn append_continuation(&mut self, tag: &str, text: &str) -> bool {
        if tag == "TY" || tag == "ER" {
            return false;
        }
        match self.fields.get_mut(tag).and_then(|values| values.last_mut()) {
            Some(last) => {
                last.push(' ');
                last.push_str(text);
            }
            // value started on the line after an empty tag
            None => self.push(tag, text.to_string()),
        }
        true
    }

    /// Value of the first present tag; repeats of a single-valued tag are joined with "; ".
    pub fn first(&self, tags: &[&str]) -> Option<String> {
        tags.iter()
            .filter_map(|tag| self.fields.get(*tag))
            .find(|values| !values.is_empty())
            .map(|values| values.join("; "))
    }

    pub fn all(&self, tags: &[&str]) -> Vec<String> {
        tags.iter()
            .filter_map(|tag| self.fields.get(*tag))
            .find(|values| !values.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_multi_value(tag: &str) -> bool {
        MULTI_VALUE_TAGS.contains(&tag)
    }

    pub fn into_record(self) -> Record {
        let title = self.first(TITLE_TAGS).unwrap_or_default();
        let abstract_text = self.first(ABSTRACT_TAGS).unwrap_or_default();
        let raw_year = self.first(YEAR_TAGS).unwrap_or_default();
        let keywords = self.all(&["KW"]);

        let publication_type = self
            .first(&["M3"])
            .or_else(|| reference_type_name(&self.reference_type).map(str::to_string));

        let mut record = Record::new(title, abstract_text)
            .with_year(raw_year)
            .with_authors(self.all(AUTHOR_TAGS))
            .with_keywords(keywords.clone());

        record.tags = keywords.join("; ");
        record.reference_type = Some(self.reference_type.clone()).filter(|t| !t.is_empty());
        record.publication_type = publication_type;
        record.language = self.first(&["LA"]);
        record.source = self.first(SOURCE_TAGS);
        record.doi = self.first(&["DO"]);
        record
    }
}

/// Human readable name for the common RIS reference types.
pub fn reference_type_name(code: &str) -> Option<&'static str> {
    match code.trim().to_ascii_uppercase().as_str() {
        "JOUR" | "JFULL" | "EJOUR" => Some("journal article"),
        "CONF" | "CPAPER" => Some("conference paper"),
        "BOOK" | "EBOOK" => Some("book"),
        "CHAP" | "ECHAP" => Some("book section"),
        "THES" => Some("thesis"),
        "RPRT" => Some("report"),
        "ELEC" => Some("web page"),
        "GEN" => Some("generic"),
        _ => None,
    }
}

impl RisParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Result<Vec<Record>> {
        Ok(self
            .parse_entries(content)?
            .into_iter()
            .map(RisEntry::into_record)
            .collect())
    }

    pub fn parse_entries(&self, content: &str) -> Result<Vec<RisEntry>> {
        let mut entries = Vec::new();
        let mut current: Option<RisEntry> = None;
        let mut last_tag: Option<String> = None;

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim_start_matches('\u{feff}').trim_end();

            if line.trim().is_empty() {
                continue;
            }

            if let Some(caps) = RIS_LINE.captures(line) {
                let tag = caps[1].to_string();
                let value = caps[2].trim().to_string();

                match tag.as_str() {
                    "TY" => {
                        if let Some(open) = current.take() {
                            warn!("Record without ER before line {}, keeping it", line_no);
                            entries.push(open);
                        }
                        current = Some(RisEntry::new(value));
                    }
                    "ER" => match current.take() {
                        Some(entry) => entries.push(entry),
                        None => warn!("Stray ER at line {}", line_no),
                    },
                    _ => {
                        let entry = current.as_mut().ok_or_else(|| PipelineError::RisParse {
                            line: line_no,
                            message: format!("field {} appears outside of a TY/ER record", tag),
                        })?;
                        entry.push(&tag, value);
                    }
                }

                last_tag = Some(tag);
            } else if let Some(entry) = current.as_mut()
                && let Some(tag) = last_tag.as_deref()
            {
                if !entry.append_continuation(tag, line.trim()) {
                    debug!("Skipping text after {} at line {}", tag, line_no);
                }
            } else {
                debug!("Skipping text outside of a record at line {}", line_no);
            }
        }

        if let Some(open) = current {
            warn!("Final record has no ER tag, keeping it");
            entries.push(open);
        }

        debug!("Parsed {} RIS entries", entries.len());
        Ok(entries)
    }
}

impl Default for RisParser {
    fn default() -> Self {
        Self::new()
    }
}
