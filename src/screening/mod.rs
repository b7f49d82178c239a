// file: src/screening/mod.rs
// description: PRISMA screening module exports
// reference: internal module structure

pub mod criteria;
pub mod screener;

pub use criteria::{Verdict, check_criteria, match_any};
pub use screener::{Screener, ScreeningOutcome};
