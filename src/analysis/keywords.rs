// file: src/analysis/keywords.rs
// description: corpus-wide keyword frequencies over record abstracts
// reference: bag-of-words term counting

use crate::analysis::tokenizer::Tokenizer;
use crate::models::Record;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub term: String,
    pub count: usize,
}

/// Total occurrences of each term across all token lists.
pub fn term_frequencies(token_lists: &[Vec<String>]) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for tokens in token_lists {
        for token in tokens {
            *freq.entry(token.clone()).or_insert(0) += 1;
        }
    }
    freq
}

/// Frequency descending, then term ascending.
pub fn rank_terms(freq: &HashMap<String, usize>) -> Vec<KeywordCount> {
    let mut ranked: Vec<KeywordCount> = freq
        .iter()
        .map(|(term, &count)| KeywordCount {
            term: term.clone(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    ranked
}

/// Top keywords from the abstracts, after capping the vocabulary at `max_features` terms.
pub fn extract_keywords(
    records: &[Record],
    tokenizer: &Tokenizer,
    top_n: usize,
    max_features: usize,
) -> Vec<KeywordCount> {
    let token_lists: Vec<Vec<String>> = records
        .iter()
        .map(|r| tokenizer.tokenize(&r.abstract_text))
        .collect();

    let mut ranked = rank_terms(&term_frequencies(&token_lists));
    debug!(
        "Vocabulary of {} terms from {} abstracts",
        ranked.len(),
        records.len()
    );

    ranked.truncate(max_features);
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<Record> {
        vec![
            Record::new("a", "Urban freight hubs reduce freight traffic."),
            Record::new("b", "Cargo bikes serve urban hubs."),
            Record::new("c", ""),
        ]
    }

    #[test]
    fn test_extract_keywords_order() {
        let keywords = extract_keywords(&records(), &Tokenizer::new(), 4, 1000);
        let terms: Vec<(&str, usize)> = keywords
            .iter()
            .map(|k| (k.term.as_str(), k.count))
            .collect();

        assert_eq!(
            terms,
            vec![("freight", 2), ("hubs", 2), ("urban", 2), ("bikes", 1)]
        );
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let keywords = extract_keywords(&records(), &Tokenizer::new(), 20, 2);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].term, "freight");
    }

    #[test]
    fn test_empty_corpus() {
        assert!(extract_keywords(&[], &Tokenizer::new(), 10, 10).is_empty());
    }
}
