// file: src/cleaning/mod.rs
// description: record cleaning and duplicate detection
// reference: internal module structure

pub mod dedup;
pub mod normalizer;

pub use dedup::{DuplicateMatch, Deduplicator};
pub use normalizer::{CleanOutcome, RecordNormalizer, clean_records};
