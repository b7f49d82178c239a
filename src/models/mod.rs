// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod criteria;
pub mod decision;
pub mod record;
pub mod theme;

pub use criteria::{Criteria, ExclusionCriteria, InclusionCriteria, YearBound, YearCutoff, YearWindow};
pub use decision::{Decision, DecisionEntry, Stage};
pub use record::{Record, extract_year, normalize_title};
pub use theme::{Theme, ThemeMap};
