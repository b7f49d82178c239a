// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod analysis;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod exporter;
pub mod fetch;
pub mod graph;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prisma;
pub mod screening;
pub mod sources;
pub mod utils;
pub mod visualization;

pub use analysis::{
    ClusterNaming, ClusterParams, ClusterSet, KeywordCount, Tokenizer, cluster_keywords,
    extract_keywords, name_clusters,
};
pub use cleaning::{RecordNormalizer, clean_records};
pub use config::{Config, PathsConfig};
pub use error::{PipelineError, Result};
pub use exporter::GraphExporter;
pub use fetch::{MendeleyClient, documents_to_records, extract_code, save_metadata};
pub use graph::{AuthorGraph, KeywordGraph, Layout, LayoutParams, compute_layout};
pub use models::{Criteria, Decision, DecisionEntry, Record, Stage, ThemeMap};
pub use parser::load_records;
pub use pipeline::{Pipeline, PipelineStats, ProgressTracker, RunSummary};
pub use prisma::{DecisionLog, PrismaCounts, PrismaDiagram, update_counts};
pub use screening::{Screener, ScreeningOutcome};
pub use sources::load_input;
pub use utils::Validator;
