// file: src/prisma/mod.rs
// description: PRISMA decision log, stage counts and flow diagram export
// reference: internal module structure

pub mod counts;
pub mod diagram;
pub mod log;

pub use counts::{PrismaCounts, count_loaded, update_counts};
pub use diagram::{DiagramRow, PrismaDiagram};
pub use log::{DecisionLog, log_decision};
