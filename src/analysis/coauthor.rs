// file: src/analysis/coauthor.rs
// description: co-authorship counts and topical grouping of authors
// reference: symmetric author adjacency matrix

use crate::analysis::cluster::{ClusterParams, ClusterSet, cluster_keywords};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;
use crate::models::Record;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Unordered author pairs with the number of records they share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorMatrix {
    authors: BTreeSet<String>,
    pairs: BTreeMap<(String, String), usize>,
}

impl AuthorMatrix {
    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    pub fn get(&self, a: &str, b: &str) -> usize {
        self.pairs.get(&Self::key(a, b)).copied().unwrap_or(0)
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(String::as_str)
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// Each co-authoring pair once, `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.pairs
            .iter()
            .map(|((a, b), &w)| (a.as_str(), b.as_str(), w))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub fn build_author_matrix(records: &[Record]) -> AuthorMatrix {
    let mut matrix = AuthorMatrix::default();

    for record in records {
        let authors: BTreeSet<&str> = record
            .authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        let authors: Vec<&str> = authors.into_iter().collect();

        for (i, a) in authors.iter().enumerate() {
            matrix.authors.insert(a.to_string());
            for b in &authors[i + 1..] {
                *matrix.pairs.entry(AuthorMatrix::key(a, b)).or_insert(0) += 1;
            }
        }
    }

    info!(
        "Co-authorship matrix: {} authors, {} pairs",
        matrix.authors.len(),
        matrix.pairs.len()
    );
    matrix
}

/// Groups authors by the vocabulary of the records they wrote.
pub fn cluster_authors(
    records: &[Record],
    tokenizer: &Tokenizer,
    params: &ClusterParams,
) -> Result<(BTreeMap<String, String>, ClusterSet)> {
    let mut author_tokens: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for record in records {
        let tokens = tokenizer.tokenize(&record.text_fields());
        if tokens.is_empty() {
            continue;
        }
        for author in &record.authors {
            let author = author.trim();
            if !author.is_empty() {
                author_tokens
                    .entry(author)
                    .or_default()
                    .extend(tokens.iter().cloned());
            }
        }
    }

    let authors: Vec<&str> = author_tokens.keys().copied().collect();
    let token_lists: Vec<Vec<String>> = author_tokens.into_values().collect();
    let set = cluster_keywords(&token_lists, params)?;

    let labels = authors
        .into_iter()
        .zip(&set.assignments)
        .map(|(author, label)| (author.to_string(), format!("Cluster {}", label + 1)))
        .collect();
    Ok((labels, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(title: &str, authors: &[&str]) -> Record {
        Record::new(title, "abstract").with_authors(authors.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_pairs_counted_once_per_record() {
        let records = vec![
            record("one", &["Lee, A.", "Kim, B.", "Lee, A."]),
            record("two", &["Kim, B.", "Lee, A.", "Park, C."]),
            record("three", &["Solo, D."]),
        ];

        let matrix = build_author_matrix(&records);

        assert_eq!(matrix.author_count(), 4);
        assert_eq!(matrix.get("Lee, A.", "Kim, B."), 2);
        assert_eq!(matrix.get("Kim, B.", "Lee, A."), 2);
        assert_eq!(matrix.get("Park, C.", "Lee, A."), 1);
        assert_eq!(matrix.get("Solo, D.", "Lee, A."), 0);
        assert_eq!(matrix.get("Lee, A.", "Lee, A."), 0);
        assert_eq!(matrix.pairs().count(), 3);
    }

    #[test]
    fn test_empty_records() {
        assert!(build_author_matrix(&[]).is_empty());
    }

    #[test]
    fn test_cluster_authors_by_topic() {
        let records = vec![
            Record::new("Freight hubs", "Freight delivery hubs")
                .with_authors(vec!["A".to_string(), "B".to_string()]),
            Record::new("Flood risk", "Storm flood risk")
                .with_authors(vec!["C".to_string()]),
        ];
        let params = ClusterParams {
            n_clusters: 2,
            ..ClusterParams::default()
        };

        let (labels, set) = cluster_authors(&records, &Tokenizer::new(), &params).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels["A"], labels["B"]);
        assert_ne!(labels["A"], labels["C"]);
        assert_eq!(set.len(), 2);
    }
}
