// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;

pub use orchestrator::{
    AUTHOR_MAP, AuthorReport, ClusterReport, INCLUDED_RECORDS, KEYWORD_CHART, Pipeline, RunSummary,
    THEME_CHART, VOS_MAP,
};
pub use progress::{PipelineStats, ProgressTracker};
