// file: src/models/record.rs
// description: bibliographic record model shared by every pipeline stage
// reference: RIS / Mendeley document fields

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_year: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl Record {
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        let mut record = Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            ..Self::default()
        };
        record.refresh_id();
        record
    }

    pub fn with_year(mut self, raw_year: impl Into<String>) -> Self {
        self.raw_year = raw_year.into();
        self.year = extract_year(&self.raw_year);
        self.refresh_id();
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Recomputes the id from the normalized title and year.
    pub fn refresh_id(&mut self) {
        self.id = Self::compute_id(&self.title, self.year);
    }

    pub fn compute_id(title: &str, year: Option<i32>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_title(title).as_bytes());
        if let Some(year) = year {
            hasher.update(year.to_string().as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }

    /// Title, abstract and keywords joined for text analysis.
    pub fn text_fields(&self) -> String {
        let keywords = self.keywords.join(" ");
        format!("{} {} {}", self.title, self.abstract_text, keywords)
            .trim()
            .to_string()
    }
}

/// Lowercased alphanumerics separated by single spaces.
pub fn normalize_title(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First run of four ASCII digits, e.g. "2019/05/01/" -> 2019.
pub fn extract_year(raw: &str) -> Option<i32> {
    let bytes = raw.as_bytes();
    let mut run = 0;
    for (idx, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            run += 1;
            if run == 4 {
                let next_is_digit = bytes.get(idx + 1).is_some_and(|n| n.is_ascii_digit());
                if !next_is_digit {
                    return raw[idx - 3..=idx].parse().ok();
                }
            }
        } else {
            run = 0;
        }
    }
    None
}
