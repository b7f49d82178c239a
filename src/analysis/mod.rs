// file: src/analysis/mod.rs
// description: keyword extraction, clustering and co-authorship analysis
// reference: internal module structure

pub mod cluster;
pub mod coauthor;
pub mod keywords;
pub mod stopwords;
pub mod themes;
pub mod tokenizer;

pub use cluster::{ClusterParams, ClusterSet, KeywordCluster, cluster_keywords};
pub use coauthor::{AuthorMatrix, build_author_matrix, cluster_authors};
pub use keywords::{KeywordCount, extract_keywords, rank_terms, term_frequencies};
pub use themes::{ClusterNaming, name_clusters};
pub use tokenizer::Tokenizer;
