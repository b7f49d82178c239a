// file: src/analysis/tokenizer.rs
// description: word tokenizer for abstracts with stop word filtering
// reference: CountVectorizer default token pattern

use crate::analysis::stopwords::is_stop_word;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    extra_stopwords: HashSet<String>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_stopwords
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    fn keep(&self, token: &str) -> bool {
        !is_stop_word(token)
            && !self.extra_stopwords.contains(token)
            && !token.chars().all(|c| c.is_ascii_digit())
    }

    /// Lowercased tokens of two or more word characters, in document order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| self.keep(t))
            .map(str::to_string)
            .collect()
    }

    /// Drops stop words from an already tokenized document.
    pub fn filter_tokens(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| self.keep(t))
            .collect()
    }
}
