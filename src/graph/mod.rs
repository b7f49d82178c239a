// file: src/graph/mod.rs
// description: keyword and co-authorship networks and their layouts
// reference: internal module structure

pub mod author_graph;
pub mod keyword_graph;
pub mod layout;

pub use author_graph::{AuthorGraph, AuthorNode};
pub use keyword_graph::{CoOccurrence, KeywordGraph, KeywordNode};
pub use layout::{Layout, LayoutParams, Point, compute_layout};
